//! Print the sheet names of a workbook and the first rows of one sheet.
//! Usage: cargo run --bin inspect_workbook -- path/to/workbook.xlsx [sheet] [rows]

use std::path::Path;

use armorer::data::workbook::load_workbook;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let path = args
        .next()
        .ok_or("Usage: inspect_workbook <path-to.xlsx> [sheet] [rows]")?;
    let path = Path::new(&path);
    if !path.exists() {
        return Err(format!("File not found: {}", path.display()).into());
    }
    let wanted = args.next();
    let rows: u32 = args.next().and_then(|r| r.parse().ok()).unwrap_or(25);

    let workbook = load_workbook(path)?;
    let names = workbook.sheet_names();
    println!("Sheets ({}): {}", names.len(), names.join(", "));

    let sheet = match wanted.as_deref() {
        Some(name) => workbook
            .sheet(name)
            .ok_or_else(|| format!("No sheet named '{name}'"))?,
        None => workbook.sheets().first().ok_or("No sheets")?,
    };
    println!(
        "\nUsing sheet: {}\nSize: {} rows x {} cols\nFirst {} rows:",
        sheet.name,
        sheet.height(),
        sheet.width(),
        rows
    );
    for row in 1..=rows.min(sheet.height()) {
        let cells: Vec<String> = (1..=sheet.width())
            .map(|col| sheet.cell(row, col).as_text().unwrap_or_default())
            .collect();
        println!("  {}: {}", row, cells.join(" | "));
    }
    Ok(())
}
