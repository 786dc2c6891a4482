//! Code 128 barcode encoding.

use core::fmt;

use crate::label_ir::BarcodeImage;

/// Turns SKU text into a 1D barcode image.
///
/// Takes `&mut self`: an implementation may reuse internal buffers between
/// calls, and the exclusive borrow keeps generation serial.
pub trait BarcodeRenderer {
    fn render_barcode(&mut self, data: &str) -> Result<BarcodeImage, BarcodeError>;
}

/// Barcode generation failure.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BarcodeError {
    /// Nothing to encode.
    Empty,
    /// Character outside the symbology's range.
    UnsupportedCharacter { ch: char, index: usize },
    /// Failure reported by an external barcode backend.
    Backend(String),
}

impl fmt::Display for BarcodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("barcode data is empty"),
            Self::UnsupportedCharacter { ch, index } => {
                write!(f, "unsupported barcode character {:?} at {}", ch, index)
            }
            Self::Backend(msg) => write!(f, "barcode backend failed: {}", msg),
        }
    }
}

impl std::error::Error for BarcodeError {}

const START_B: u8 = 104;
const START_C: u8 = 105;
const CHECKSUM_MODULUS: u32 = 103;

/// Bar/space widths per symbol value, starting with a bar.
#[rustfmt::skip]
const PATTERNS: [[u8; 6]; 106] = [
    [2, 1, 2, 2, 2, 2], [2, 2, 2, 1, 2, 2], [2, 2, 2, 2, 2, 1], [1, 2, 1, 2, 2, 3],
    [1, 2, 1, 3, 2, 2], [1, 3, 1, 2, 2, 2], [1, 2, 2, 2, 1, 3], [1, 2, 2, 3, 1, 2],
    [1, 3, 2, 2, 1, 2], [2, 2, 1, 2, 1, 3], [2, 2, 1, 3, 1, 2], [2, 3, 1, 2, 1, 2],
    [1, 1, 2, 2, 3, 2], [1, 2, 2, 1, 3, 2], [1, 2, 2, 2, 3, 1], [1, 1, 3, 2, 2, 2],
    [1, 2, 3, 1, 2, 2], [1, 2, 3, 2, 2, 1], [2, 2, 3, 2, 1, 1], [2, 2, 1, 1, 3, 2],
    [2, 2, 1, 2, 3, 1], [2, 1, 3, 2, 1, 2], [2, 2, 3, 1, 1, 2], [3, 1, 2, 1, 3, 1],
    [3, 1, 1, 2, 2, 2], [3, 2, 1, 1, 2, 2], [3, 2, 1, 2, 2, 1], [3, 1, 2, 2, 1, 2],
    [3, 2, 2, 1, 1, 2], [3, 2, 2, 2, 1, 1], [2, 1, 2, 1, 2, 3], [2, 1, 2, 3, 2, 1],
    [2, 3, 2, 1, 2, 1], [1, 1, 1, 3, 2, 3], [1, 3, 1, 1, 2, 3], [1, 3, 1, 3, 2, 1],
    [1, 1, 2, 3, 1, 3], [1, 3, 2, 1, 1, 3], [1, 3, 2, 3, 1, 1], [2, 1, 1, 3, 1, 3],
    [2, 3, 1, 1, 1, 3], [2, 3, 1, 3, 1, 1], [1, 1, 2, 1, 3, 3], [1, 1, 2, 3, 3, 1],
    [1, 3, 2, 1, 3, 1], [1, 1, 3, 1, 2, 3], [1, 1, 3, 3, 2, 1], [1, 3, 3, 1, 2, 1],
    [3, 1, 3, 1, 2, 1], [2, 1, 1, 3, 3, 1], [2, 3, 1, 1, 3, 1], [2, 1, 3, 1, 1, 3],
    [2, 1, 3, 3, 1, 1], [2, 1, 3, 1, 3, 1], [3, 1, 1, 1, 2, 3], [3, 1, 1, 3, 2, 1],
    [3, 3, 1, 1, 2, 1], [3, 1, 2, 1, 1, 3], [3, 1, 2, 3, 1, 1], [3, 3, 2, 1, 1, 1],
    [3, 1, 4, 1, 1, 1], [2, 2, 1, 4, 1, 1], [4, 3, 1, 1, 1, 1], [1, 1, 1, 2, 2, 4],
    [1, 1, 1, 4, 2, 2], [1, 2, 1, 1, 2, 4], [1, 2, 1, 4, 2, 1], [1, 4, 1, 1, 2, 2],
    [1, 4, 1, 2, 2, 1], [1, 1, 2, 2, 1, 4], [1, 1, 2, 4, 1, 2], [1, 2, 2, 1, 1, 4],
    [1, 2, 2, 4, 1, 1], [1, 4, 2, 1, 1, 2], [1, 4, 2, 2, 1, 1], [2, 4, 1, 2, 1, 1],
    [2, 2, 1, 1, 1, 4], [4, 1, 3, 1, 1, 1], [2, 4, 1, 1, 1, 2], [1, 3, 4, 1, 1, 1],
    [1, 1, 1, 2, 4, 2], [1, 2, 1, 1, 4, 2], [1, 2, 1, 2, 4, 1], [1, 1, 4, 2, 1, 2],
    [1, 2, 4, 1, 1, 2], [1, 2, 4, 2, 1, 1], [4, 1, 1, 2, 1, 2], [4, 2, 1, 1, 1, 2],
    [4, 2, 1, 2, 1, 1], [2, 1, 2, 1, 4, 1], [2, 1, 4, 1, 2, 1], [4, 1, 2, 1, 2, 1],
    [1, 1, 1, 1, 4, 3], [1, 1, 1, 3, 4, 1], [1, 3, 1, 1, 4, 1], [1, 1, 4, 1, 1, 3],
    [1, 1, 4, 3, 1, 1], [4, 1, 1, 1, 1, 3], [4, 1, 1, 3, 1, 1], [1, 1, 3, 1, 4, 1],
    [1, 1, 4, 1, 3, 1], [3, 1, 1, 1, 4, 1], [4, 1, 1, 1, 3, 1], [2, 1, 1, 4, 1, 2],
    [2, 1, 1, 2, 1, 4], [2, 1, 1, 2, 3, 2],
];

const STOP: [u8; 7] = [2, 3, 3, 1, 1, 1, 2];

/// Code 128 encoder using code sets B and C.
///
/// Even-length all-digit data of four or more digits is packed in set C;
/// everything else uses set B, which covers printable ASCII.
#[derive(Clone, Debug, Default)]
pub struct Code128 {
    /// Symbol values of the last encode, reused across calls.
    values: Vec<u8>,
}

impl Code128 {
    pub fn new() -> Self {
        Self::default()
    }

    fn fill_values(&mut self, data: &str) -> Result<(), BarcodeError> {
        self.values.clear();
        let bytes = data.as_bytes();
        if bytes.len() >= 4 && bytes.len() % 2 == 0 && bytes.iter().all(u8::is_ascii_digit) {
            self.values.push(START_C);
            for pair in bytes.chunks_exact(2) {
                self.values.push((pair[0] - b'0') * 10 + (pair[1] - b'0'));
            }
            return Ok(());
        }
        self.values.push(START_B);
        for (index, ch) in data.chars().enumerate() {
            if !matches!(ch, ' '..='~') {
                return Err(BarcodeError::UnsupportedCharacter { ch, index });
            }
            self.values.push(ch as u8 - b' ');
        }
        Ok(())
    }

    /// Weighted sum mod 103, reduced per symbol so long data cannot overflow.
    fn checksum(values: &[u8]) -> u8 {
        let sum = values.iter().enumerate().fold(0u32, |acc, (pos, value)| {
            let weight = (pos as u32 % CHECKSUM_MODULUS).max(1);
            (acc + u32::from(*value) * weight) % CHECKSUM_MODULUS
        });
        sum as u8
    }
}

fn push_widths(modules: &mut Vec<bool>, widths: &[u8]) {
    for (i, width) in widths.iter().enumerate() {
        let dark = i % 2 == 0;
        modules.extend(core::iter::repeat(dark).take(usize::from(*width)));
    }
}

impl BarcodeRenderer for Code128 {
    fn render_barcode(&mut self, data: &str) -> Result<BarcodeImage, BarcodeError> {
        if data.is_empty() {
            return Err(BarcodeError::Empty);
        }
        self.fill_values(data)?;
        let check = Self::checksum(&self.values);
        self.values.push(check);

        let mut modules = Vec::with_capacity(self.values.len() * 11 + STOP.len() + 6);
        for value in &self.values {
            push_widths(&mut modules, &PATTERNS[usize::from(*value)]);
        }
        push_widths(&mut modules, &STOP);
        Ok(BarcodeImage {
            data: data.to_string(),
            modules,
        })
    }
}
