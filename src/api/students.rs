use super::{not_found, ApiClient, Method};
use crate::error::Result;
use crate::models::{Student, StudentInput};

const STUDENTS: &str = "/api/students/";

impl ApiClient {
    pub fn list_students(&self) -> Result<Vec<Student>> {
        self.get_json(STUDENTS)
    }

    pub fn get_student(&self, roll_no: i64) -> Result<Student> {
        not_found(
            self.get_json(&format!("{STUDENTS}{roll_no}/")),
            "Student",
            roll_no,
        )
    }

    pub fn create_student(&self, input: &StudentInput) -> Result<Student> {
        self.send_multipart(Method::Post, STUDENTS, input.to_form()?)
    }

    /// Partial update; only the fields set on `input` are sent.
    pub fn update_student(&self, roll_no: i64, input: &StudentInput) -> Result<Student> {
        not_found(
            self.send_multipart(
                Method::Patch,
                &format!("{STUDENTS}{roll_no}/"),
                input.to_form()?,
            ),
            "Student",
            roll_no,
        )
    }

    pub fn delete_student(&self, roll_no: i64) -> Result<()> {
        not_found(
            self.delete(&format!("{STUDENTS}{roll_no}/")),
            "Student",
            roll_no,
        )
    }
}
