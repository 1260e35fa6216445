//! Fee challan documents: layout data built from one fee record, rendered to PDF.

use chrono::{Duration, Local, NaiveDateTime};
use serde::Serialize;
use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::config::{resolve_path, Config};
use crate::dates::month_label;
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::error::{Result, SchoolError};
use crate::models::{Record, StudentFee};
use crate::pdf::render_challan;

/// Printed once per copy, left to right.
pub const COPIES: [&str; 3] = ["BANK", "SCHOOL", "STUDENT"];

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ChallanLine {
    pub label: String,
    pub amount: String,
}

/// Everything the template prints. Amounts are preformatted.
#[derive(Debug, Clone, Serialize)]
pub struct ChallanDocument {
    pub copies: Vec<String>,
    pub school_name: String,
    pub footer: Option<String>,
    pub currency_symbol: String,
    pub month: String,
    pub challan_no: i64,
    pub issue_date: String,
    pub due_date: String,
    pub student_name: String,
    pub roll_no: i64,
    pub grade: i32,
    pub items: Vec<ChallanLine>,
    pub total: String,
    pub note: Option<String>,
    pub generated_at: String,
    /// File name of the staged logo, filled in by the renderer.
    pub logo: Option<String>,
    #[serde(skip)]
    pub logo_source: Option<PathBuf>,
}

/// `Fee_Challan_<name>_<id>.pdf`, whitespace runs in the name become `_`.
pub fn challan_filename(fee: &StudentFee) -> String {
    let name = fee
        .student_info
        .name
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .replace(['/', '\\'], "_");
    format!("Fee_Challan_{}_{}.pdf", name, fee.id)
}

/// The description, unless it is blank or exactly the placeholder value.
fn note_for(fee: &StudentFee, placeholder: &str) -> Option<String> {
    let text = fee.description.as_deref()?;
    if text.trim().is_empty() || text == placeholder {
        None
    } else {
        Some(text.trim().to_string())
    }
}

/// Leading bytes of the image formats Typst can embed.
const IMAGE_SIGNATURES: [&[u8]; 6] = [
    b"\x89PNG\r\n\x1a\n",
    b"\xff\xd8\xff",
    b"GIF87a",
    b"GIF89a",
    b"<svg",
    b"<?xml",
];

fn has_image_signature(path: &Path) -> std::io::Result<bool> {
    let mut header = Vec::with_capacity(8);
    File::open(path)?.take(8).read_to_end(&mut header)?;
    Ok(IMAGE_SIGNATURES.iter().any(|sig| header.starts_with(sig)))
}

/// Configured logo path, if it points at a readable image file. Anything else
/// is recorded and the challan is built without it.
fn logo_source(config: &Config, cfg_dir: &Path, diagnostics: &mut Diagnostics) -> Option<PathBuf> {
    let path = resolve_path(config.school.logo.as_deref()?, cfg_dir);
    let reason = match fs::metadata(&path) {
        Ok(meta) if !meta.is_file() => "not a file".to_string(),
        Ok(_) => match has_image_signature(&path) {
            Ok(true) => return Some(path),
            Ok(false) => "not a PNG, JPEG, GIF or SVG image".to_string(),
            Err(e) => e.to_string(),
        },
        Err(e) => e.to_string(),
    };
    diagnostics.record(Diagnostic::AssetUnavailable { path, reason });
    None
}

/// Lay out one challan. Only non-zero charges are listed.
pub fn build_challan(
    fee: &StudentFee,
    config: &Config,
    cfg_dir: &Path,
    now: NaiveDateTime,
    diagnostics: &mut Diagnostics,
) -> Result<ChallanDocument> {
    let today = now.date();
    let due_days = config.challan.due_days;
    let due = today
        .checked_add_signed(Duration::days(i64::from(due_days)))
        .ok_or_else(|| {
            SchoolError::invalid(
                "challan.due_days",
                &due_days.to_string(),
                "due date is past the last representable date",
            )
        })?;

    let items = fee
        .charges
        .items()
        .filter(|(_, amount)| !amount.is_zero())
        .map(|(kind, amount)| ChallanLine {
            label: kind.label().to_string(),
            amount: amount.grouped(),
        })
        .collect();

    Ok(ChallanDocument {
        copies: COPIES.iter().map(|c| c.to_string()).collect(),
        school_name: config.school.name.clone(),
        footer: config.school.footer.clone(),
        currency_symbol: config.school.currency_symbol.clone(),
        month: month_label(&fee.month),
        challan_no: fee.id,
        issue_date: today.format("%d-%b-%Y").to_string(),
        due_date: due.format("%d-%b-%Y").to_string(),
        student_name: fee.student_info.name.clone(),
        roll_no: fee.student_info.roll_no,
        grade: fee.student_info.grade,
        items,
        total: fee.total_fee.grouped(),
        note: note_for(fee, &config.challan.placeholder_note),
        generated_at: now.format("%d-%b-%Y %H:%M").to_string(),
        logo: None,
        logo_source: logo_source(config, cfg_dir, diagnostics),
    })
}

/// Result of a batch run, in selection order.
#[derive(Debug, Default)]
pub struct ChallanBatch {
    pub saved: Vec<PathBuf>,
    /// Records whose challan could not be produced, with the reason.
    pub failed: Vec<(i64, SchoolError)>,
}

/// One challan per record, in the given order. A failing record is reported in
/// the batch and the rest still render; only a missing Typst CLI stops the run.
pub fn generate_challans<'a>(
    fees: impl IntoIterator<Item = &'a StudentFee>,
    config: &Config,
    cfg_dir: &Path,
    output_dir: &Path,
    diagnostics: &mut Diagnostics,
) -> Result<ChallanBatch> {
    generate_with(fees, config, cfg_dir, output_dir, diagnostics, render_challan)
}

fn generate_with<'a, R>(
    fees: impl IntoIterator<Item = &'a StudentFee>,
    config: &Config,
    cfg_dir: &Path,
    output_dir: &Path,
    diagnostics: &mut Diagnostics,
    mut render: R,
) -> Result<ChallanBatch>
where
    R: FnMut(&ChallanDocument, &Path, &mut Diagnostics) -> Result<()>,
{
    fs::create_dir_all(output_dir)?;
    let now = Local::now().naive_local();
    let mut batch = ChallanBatch::default();

    for fee in fees {
        let written = build_challan(fee, config, cfg_dir, now, diagnostics).and_then(|document| {
            let path = output_dir.join(challan_filename(fee));
            render(&document, &path, diagnostics).map(|()| path)
        });
        match written {
            Ok(path) => {
                log::info!("wrote {}", path.display());
                batch.saved.push(path);
            }
            Err(SchoolError::TypstNotFound) => return Err(SchoolError::TypstNotFound),
            Err(e) => {
                log::warn!("challan for {} failed: {e}", fee.describe());
                batch.failed.push((fee.id, e));
            }
        }
    }

    Ok(batch)
}
