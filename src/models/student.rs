use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::{default_true, has_file, Record};
use crate::api::Multipart;
use crate::error::Result;
use crate::money::Money;

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Student {
    pub roll_no: i64,
    pub name: String,
    #[serde(default)]
    pub father_name: String,
    #[serde(default)]
    pub grade: i32,
    #[serde(default)]
    pub contact: String,
    #[serde(rename = "DOB", default)]
    pub dob: Option<String>,
    #[serde(default)]
    pub admission_date: Option<String>,
    #[serde(default)]
    pub address: String,
    /// The backend model spells this `tution_fee`.
    #[serde(alias = "tution_fee", default)]
    pub tuition_fee: Money,
    #[serde(default)]
    pub security_fee: Money,
    #[serde(default)]
    pub admission_fee: Money,
    #[serde(default)]
    pub pending_fee: Money,
    #[serde(default)]
    pub scanned_doc: Option<String>,
    #[serde(default = "default_true")]
    pub enrolled: bool,
}

impl Student {
    pub fn has_document(&self) -> bool {
        has_file(&self.scanned_doc)
    }
}

impl Record for Student {
    type Id = i64;

    fn id(&self) -> i64 {
        self.roll_no
    }

    fn describe(&self) -> String {
        format!("student #{} ({})", self.roll_no, self.name)
    }
}

/// Fields for creating or patching a student. Unset fields are not sent.
#[derive(Debug, Default, Clone)]
pub struct StudentInput {
    pub name: Option<String>,
    pub father_name: Option<String>,
    pub grade: Option<i32>,
    pub contact: Option<String>,
    pub dob: Option<String>,
    pub admission_date: Option<String>,
    pub address: Option<String>,
    pub tuition_fee: Option<Money>,
    pub security_fee: Option<Money>,
    pub admission_fee: Option<Money>,
    pub pending_fee: Option<Money>,
    pub enrolled: Option<bool>,
    pub document: Option<PathBuf>,
}

impl StudentInput {
    /// Multipart body; the scanned document travels as the `scanned_doc` file part.
    pub fn to_form(&self) -> Result<Multipart> {
        let mut form = Multipart::new();
        form.text_opt("name", self.name.as_deref());
        form.text_opt("father_name", self.father_name.as_deref());
        form.text_opt("grade", self.grade.map(|g| g.to_string()).as_deref());
        form.text_opt("contact", self.contact.as_deref());
        form.text_opt("DOB", self.dob.as_deref());
        form.text_opt("admission_date", self.admission_date.as_deref());
        form.text_opt("address", self.address.as_deref());
        for (name, value) in [
            ("tution_fee", self.tuition_fee),
            ("security_fee", self.security_fee),
            ("admission_fee", self.admission_fee),
            ("pending_fee", self.pending_fee),
        ] {
            form.text_opt(name, value.map(|m| m.to_string()).as_deref());
        }
        form.text_opt("enrolled", self.enrolled.map(|e| e.to_string()).as_deref());
        if let Some(path) = &self.document {
            form.file("scanned_doc", path)?;
        }
        Ok(form)
    }
}
