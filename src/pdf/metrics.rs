/// Advance widths for a font, in 1/1000 em units.
#[derive(Debug, Clone)]
pub struct FontMetrics {
    /// Widths for code points 32..=126, indexed by `c - 32`.
    ascii: &'static [u16; 95],
    default_advance: u16,
}

// Helvetica AFM widths, space through tilde.
static HELVETICA_ASCII: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // '0'..'9'
    278, 278, 584, 584, 584, 556, 1015, // ':'..'@'
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, // 'A'..'M'
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // 'N'..'Z'
    278, 278, 278, 469, 556, 333, // '['..'`'
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, // 'a'..'m'
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, // 'n'..'z'
    334, 260, 334, 584, // '{'..'~'
];

impl FontMetrics {
    /// Metrics of the built-in Helvetica face used by the template renderer.
    pub fn helvetica() -> Self {
        Self { ascii: &HELVETICA_ASCII, default_advance: 556 }
    }

    pub fn with_default_advance(mut self, advance: u16) -> Self {
        self.default_advance = advance;
        self
    }

    pub fn advance(&self, c: char) -> u16 {
        let code = c as u32;
        if (32..=126).contains(&code) {
            return self.ascii[(code - 32) as usize];
        }
        match c {
            '\u{00A0}' => self.ascii[0],
            // Latin-1 letters take the width of their base letter.
            'á' | 'à' | 'â' | 'ã' | 'ä' | 'å' => self.advance('a'),
            'é' | 'è' | 'ê' | 'ë' => self.advance('e'),
            'í' | 'ì' | 'î' | 'ï' => self.advance('i'),
            'ó' | 'ò' | 'ô' | 'õ' | 'ö' => self.advance('o'),
            'ú' | 'ù' | 'û' | 'ü' => self.advance('u'),
            'ç' => self.advance('c'),
            'ñ' => self.advance('n'),
            'Á' | 'À' | 'Â' | 'Ã' | 'Ä' | 'Å' => self.advance('A'),
            'É' | 'È' | 'Ê' | 'Ë' => self.advance('E'),
            'Í' | 'Ì' | 'Î' | 'Ï' => self.advance('I'),
            'Ó' | 'Ò' | 'Ô' | 'Õ' | 'Ö' => self.advance('O'),
            'Ú' | 'Ù' | 'Û' | 'Ü' => self.advance('U'),
            'Ç' => self.advance('C'),
            'Ñ' => self.advance('N'),
            'º' => 365,
            'ª' => 370,
            '–' => 556,
            '—' => 1000,
            '…' => 1000,
            '•' => 350,
            _ => self.default_advance,
        }
    }

    /// Width of `text` in font units. Additive, so widths of joined strings
    /// can be computed from their parts without drift.
    pub fn units(&self, text: &str) -> u64 {
        text.chars().map(|c| u64::from(self.advance(c))).sum()
    }

    pub fn to_points(units: u64, size_pt: f32) -> f32 {
        units as f32 * size_pt / 1000.0
    }

    pub fn measure(&self, text: &str, size_pt: f32) -> f32 {
        Self::to_points(self.units(text), size_pt)
    }
}
