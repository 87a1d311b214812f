//! XLSX workbook report, grounded in the original `xls.c`'s column layout
//! and cell-coloring scheme (reimplemented against `rust_xlsxwriter` in
//! place of `libxlsxwriter`).

use std::path::{Path, PathBuf};

use rust_xlsxwriter::{Color, Format, Workbook};
use st_ports::{WorkbookRow, WorkbookSink, WorkbookSinkError};

const HEADERS: [&str; 11] = [
    "Region", "Country", "Center", "PID", "Visit", "Signature", "State", "Signer", "Date", "Time",
    "Comment",
];

pub struct XlsxWorkbookSink {
    path: PathBuf,
}

impl XlsxWorkbookSink {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

/// Map a worklist row's state label to the fill color used in the original
/// report: greens for a clean signature, oranges/reds as things worsen.
fn color_for_state(state: &str) -> Color {
    match state {
        "SIGNATURE OK" | "SDV OK" => Color::RGB(0xCC_FF_CC),
        "PENDING FINAL" => Color::RGB(0xFF_E0_B3),
        "RE-SIGN REQD" | "RE-VERIFICATION REQD" | "SIGNED IN ERROR" | "VERIFIED IN ERROR" => {
            Color::RGB(0xFF_B3_B3)
        }
        "RECORD DELETED" => Color::RGB(0xFF_00_00),
        "DATA IN ERROR" => Color::RGB(0xE0_B3_FF),
        "RECORD LOST" => Color::White,
        "NEVER SIGNED" | "NEVER VERIFIED" => Color::RGB(0xFF_FF_B3),
        _ => Color::White,
    }
}

impl WorkbookSink for XlsxWorkbookSink {
    fn write(&mut self, rows: &[WorkbookRow]) -> Result<(), WorkbookSinkError> {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();

        for (col, header) in HEADERS.iter().enumerate() {
            sheet
                .write_string(0, col as u16, *header)
                .map_err(|e| WorkbookSinkError::Io(e.to_string()))?;
        }

        for (i, row) in rows.iter().enumerate() {
            let r = (i + 1) as u32;
            let fmt = Format::new().set_background_color(color_for_state(&row.state));

            sheet
                .write_string_with_format(r, 0, &row.region, &fmt)
                .map_err(|e| WorkbookSinkError::Io(e.to_string()))?;
            sheet
                .write_string_with_format(r, 1, &row.country, &fmt)
                .map_err(|e| WorkbookSinkError::Io(e.to_string()))?;
            sheet
                .write_number_with_format(r, 2, row.center as f64, &fmt)
                .map_err(|e| WorkbookSinkError::Io(e.to_string()))?;
            sheet
                .write_number_with_format(r, 3, row.pid as f64, &fmt)
                .map_err(|e| WorkbookSinkError::Io(e.to_string()))?;
            sheet
                .write_number_with_format(r, 4, row.visit as f64, &fmt)
                .map_err(|e| WorkbookSinkError::Io(e.to_string()))?;
            sheet
                .write_string_with_format(r, 5, &row.signature_name, &fmt)
                .map_err(|e| WorkbookSinkError::Io(e.to_string()))?;
            sheet
                .write_string_with_format(r, 6, &row.state, &fmt)
                .map_err(|e| WorkbookSinkError::Io(e.to_string()))?;
            sheet
                .write_string_with_format(r, 7, &row.signer, &fmt)
                .map_err(|e| WorkbookSinkError::Io(e.to_string()))?;
            sheet
                .write_string_with_format(r, 8, &row.date, &fmt)
                .map_err(|e| WorkbookSinkError::Io(e.to_string()))?;
            sheet
                .write_string_with_format(r, 9, &row.time, &fmt)
                .map_err(|e| WorkbookSinkError::Io(e.to_string()))?;
            sheet
                .write_string_with_format(r, 10, &row.comment, &fmt)
                .map_err(|e| WorkbookSinkError::Io(e.to_string()))?;
        }

        workbook
            .save(&self.path)
            .map_err(|e| WorkbookSinkError::Io(format!("{}: {e}", self.path.display())))
    }
}
