use std::fs;
use std::path::Path;
use std::process::Command;

use crate::challan::ChallanDocument;
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::error::{Result, SchoolError};

/// Embedded Typst template for fee challans.
/// Three copies side by side on a landscape page, dashed rules between them.
const CHALLAN_TEMPLATE: &str = r##"// Fee Challan Template
// Data is loaded from JSON file

#let data = json("DATA_JSON_PATH")

#set page(
  paper: "a4",
  flipped: true,
  margin: (x: 0.8cm, y: 1cm),
)

#set text(font: "Helvetica", size: 8pt)

#let challan-copy(copy-name) = block(width: 100%)[
  #if data.logo != none [
    #align(center)[#image(data.logo, height: 1.2cm)]
  ]
  #align(center)[
    #text(size: 12pt, weight: "bold")[#data.school_name] \
    #text(size: 9pt, weight: "bold")[FEE CHALLAN] \
    For the month of #data.month \
    #text(size: 7pt, fill: gray)[#copy-name COPY]
  ]

  #v(0.4em)
  #table(
    columns: (auto, 1fr),
    stroke: none,
    inset: 2pt,
    [*Challan No:*], [#data.challan_no],
    [*Issue Date:*], [#data.issue_date],
    [*Due Date:*], [#data.due_date],
    [*Student:*], [#data.student_name],
    [*Roll No:*], [#data.roll_no],
    [*Grade:*], [#data.grade],
  )

  #v(0.4em)
  #table(
    columns: (1fr, auto),
    align: (left, right),
    stroke: 0.5pt + gray,
    inset: 4pt,
    fill: (x, y) => if y == 0 { luma(235) } else { none },

    [*Particulars*], [*Amount (#data.currency_symbol)*],
    ..data.items.map(item => (item.label, item.amount)).flatten(),
    [*Total*], [*#data.total*],
  )

  #if data.note != none [
    #v(0.3em)
    #text(size: 7pt)[*Note:* #data.note]
  ]

  #v(2.5em)
  #grid(
    columns: (1fr, 1fr),
    column-gutter: 1em,
    [#line(length: 100%, stroke: 0.5pt) #align(center)[Bank Signature]],
    [#line(length: 100%, stroke: 0.5pt) #align(center)[School Signature]],
  )

  #v(0.6em)
  #align(center)[
    #text(size: 6pt, fill: gray)[
      Generated #data.generated_at
      #if data.footer != none [ \ #data.footer ]
    ]
  ]
]

#grid(
  columns: (1fr, 1fr, 1fr),
  column-gutter: 0.6cm,
  inset: (x: 0.3cm),
  stroke: (x, y) => if x > 0 { (left: (paint: gray, thickness: 0.6pt, dash: "dashed")) },
  ..data.copies.map(name => challan-copy(name)),
)
"##;

/// Copy the logo next to the template so Typst can read it under `--root`.
/// Failures drop the logo and are recorded.
fn stage_logo(source: &Path, temp_dir: &Path, diagnostics: &mut Diagnostics) -> Option<String> {
    let ext = source
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_else(|| "png".to_string());
    let name = format!("logo.{ext}");
    match fs::copy(source, temp_dir.join(&name)) {
        Ok(_) => Some(name),
        Err(e) => {
            diagnostics.record(Diagnostic::AssetUnavailable {
                path: source.to_path_buf(),
                reason: e.to_string(),
            });
            None
        }
    }
}

/// Render one challan to `output_path` using the Typst CLI.
///
/// Each call works in its own temporary directory, removed on return. When Typst
/// rejects a page carrying the logo, the page is rendered again without it and
/// the logo is reported as unavailable.
pub fn render_challan(
    document: &ChallanDocument,
    output_path: &Path,
    diagnostics: &mut Diagnostics,
) -> Result<()> {
    if Command::new("typst").arg("--version").output().is_err() {
        return Err(SchoolError::TypstNotFound);
    }

    let work_dir = tempfile::Builder::new()
        .prefix("school-admin-challan-")
        .tempdir()?;

    let mut data = document.clone();
    data.logo = document
        .logo_source
        .as_deref()
        .and_then(|source| stage_logo(source, work_dir.path(), diagnostics));

    match (compile(&data, work_dir.path(), output_path), &document.logo_source) {
        (Err(SchoolError::PdfGeneration(reason)), Some(source)) if data.logo.is_some() => {
            log::debug!("typst rejected the page with a logo, retrying without it");
            data.logo = None;
            compile(&data, work_dir.path(), output_path)?;
            diagnostics.record(Diagnostic::AssetUnavailable {
                path: source.clone(),
                reason: first_line(&reason),
            });
            Ok(())
        }
        (result, _) => result,
    }
}

fn compile(data: &ChallanDocument, work_dir: &Path, output_path: &Path) -> Result<()> {
    let json_data =
        serde_json::to_string(data).map_err(|e| SchoolError::PdfGeneration(e.to_string()))?;
    fs::write(work_dir.join("challan.json"), &json_data)?;

    let template_content = CHALLAN_TEMPLATE.replace("DATA_JSON_PATH", "challan.json");
    let template_path = work_dir.join("challan.typ");
    fs::write(&template_path, &template_content)?;

    log::debug!("typst compile {}", output_path.display());
    let output = Command::new("typst")
        .arg("compile")
        .arg("--root")
        .arg(work_dir)
        .arg(&template_path)
        .arg(output_path)
        .output()?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(SchoolError::PdfGeneration(stderr.to_string()));
    }

    Ok(())
}

fn first_line(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or("rejected by typst")
        .to_string()
}
