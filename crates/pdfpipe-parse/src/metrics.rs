//! Built-in glyph widths for fonts that come without a `/Widths` array.
//!
//! Widths are in 1/1000 em units, indexed by WinAnsiEncoding code.

/// Width table and vertical metrics of a built-in font.
#[derive(Debug)]
pub struct BuiltinMetrics {
    pub name: &'static str,
    pub widths: [u16; 256],
    pub ascent: f64,
    pub descent: f64,
}

impl BuiltinMetrics {
    pub fn width(&self, code: u8) -> f64 {
        self.widths[code as usize] as f64
    }

    /// Mean of the non-zero widths.
    pub fn average_width(&self) -> f64 {
        let (sum, count) = self
            .widths
            .iter()
            .filter(|&&w| w > 0)
            .fold((0.0, 0usize), |(s, n), &w| (s + w as f64, n + 1));
        if count == 0 { 0.0 } else { sum / count as f64 }
    }
}

/// Built-in metrics for a `/BaseFont` name. Subset prefixes (`ABCDEF+`) and
/// style suffixes are ignored; Arial is treated as Helvetica.
pub fn lookup(base_font: &str) -> Option<&'static BuiltinMetrics> {
    let name = strip_subset_prefix(base_font);
    let family = name.split([',', '-']).next().unwrap_or(name);
    match family {
        "Helvetica" | "Arial" | "ArialMT" => Some(&HELVETICA),
        "Courier" | "CourierNew" | "CourierNewPSMT" => Some(&COURIER),
        _ => None,
    }
}

/// `ABCDEF+Name` → `Name`.
pub fn strip_subset_prefix(name: &str) -> &str {
    match name.split_once('+') {
        Some((prefix, rest))
            if prefix.len() == 6 && prefix.bytes().all(|b| b.is_ascii_uppercase()) =>
        {
            rest
        }
        _ => name,
    }
}

pub static COURIER: BuiltinMetrics = BuiltinMetrics {
    name: "Courier",
    widths: [600; 256],
    ascent: 629.0,
    descent: -157.0,
};

#[rustfmt::skip]
pub static HELVETICA: BuiltinMetrics = BuiltinMetrics {
    name: "Helvetica",
    widths: [
        0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
        0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
        // space ! " # $ % & ' ( ) * + , - . /
        278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
        // 0-9 : ; < = > ?
        556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
        // @ A-O
        1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
        // P-Z [ \ ] ^ _
        667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
        // ` a-o
        333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
        // p-z { | } ~
        556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, 0,
        556, 0, 222, 556, 333, 1000, 556, 556, 333, 1000, 667, 333, 1000, 0, 611, 0,
        0, 222, 222, 333, 333, 350, 556, 1000, 333, 1000, 500, 333, 944, 0, 500, 667,
        278, 333, 556, 556, 556, 556, 260, 556, 333, 737, 370, 556, 584, 333, 737, 333,
        400, 584, 333, 333, 333, 556, 537, 278, 333, 333, 365, 556, 834, 834, 834, 611,
        667, 667, 667, 667, 667, 667, 1000, 722, 667, 667, 667, 667, 278, 278, 278, 278,
        722, 722, 778, 778, 778, 778, 778, 584, 778, 722, 722, 722, 722, 667, 667, 611,
        556, 556, 556, 556, 556, 556, 889, 500, 556, 556, 556, 556, 278, 278, 278, 278,
        556, 556, 556, 556, 556, 556, 556, 584, 611, 556, 556, 556, 556, 500, 556, 500,
    ],
    ascent: 718.0,
    descent: -207.0,
};
