//! Color values, color spaces and RGB conversion.

/// A color in one of the supported spaces. Components are in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Color {
    Gray(f64),
    Rgb(f64, f64, f64),
    Cmyk(f64, f64, f64, f64),
    /// Entry of the fixed X11 color table.
    Named(X11Color),
}

impl Default for Color {
    fn default() -> Self {
        Self::black()
    }
}

impl Color {
    pub fn black() -> Self {
        Color::Gray(0.0)
    }

    /// Convert to an RGB triple with components in `[0, 1]`.
    pub fn to_rgb(&self) -> (f64, f64, f64) {
        match *self {
            Color::Gray(v) => {
                let v = clamp_unit(v);
                (v, v, v)
            }
            Color::Rgb(r, g, b) => (clamp_unit(r), clamp_unit(g), clamp_unit(b)),
            Color::Cmyk(c, m, y, k) => {
                let k = 1.0 - clamp_unit(k);
                (
                    (1.0 - clamp_unit(c)) * k,
                    (1.0 - clamp_unit(m)) * k,
                    (1.0 - clamp_unit(y)) * k,
                )
            }
            Color::Named(named) => {
                let [r, g, b] = named.rgb8();
                (r as f64 / 255.0, g as f64 / 255.0, b as f64 / 255.0)
            }
        }
    }

    /// Convert to an RGB triple of bytes.
    pub fn to_rgb8(&self) -> [u8; 3] {
        let (r, g, b) = self.to_rgb();
        [to_byte(r), to_byte(g), to_byte(b)]
    }
}

fn clamp_unit(v: f64) -> f64 {
    if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) }
}

fn to_byte(v: f64) -> u8 {
    (v * 255.0).round() as u8
}

/// Color space families recognized by the color operators.
///
/// Only the three device spaces convert their operands; the other families
/// accept operands but leave the color at its initial (black) value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ColorSpace {
    #[default]
    DeviceGray,
    DeviceRgb,
    DeviceCmyk,
    CalGray,
    CalRgb,
    Lab,
    IccBased {
        components: u8,
    },
    Indexed,
    Separation,
    DeviceN {
        components: u8,
    },
    Pattern,
}

impl ColorSpace {
    /// Resolve a color space family name, including the abbreviations used
    /// in inline image dictionaries (`G`, `RGB`, `CMYK`, `I`).
    ///
    /// `ICCBased` and `DeviceN` need their component count from the full
    /// resource definition; from a bare name they default to 3 and 1.
    pub fn from_name(name: &str) -> Option<Self> {
        let space = match name {
            "DeviceGray" | "G" => ColorSpace::DeviceGray,
            "DeviceRGB" | "RGB" => ColorSpace::DeviceRgb,
            "DeviceCMYK" | "CMYK" => ColorSpace::DeviceCmyk,
            "CalGray" => ColorSpace::CalGray,
            "CalRGB" => ColorSpace::CalRgb,
            "Lab" => ColorSpace::Lab,
            "ICCBased" => ColorSpace::IccBased { components: 3 },
            "Indexed" | "I" => ColorSpace::Indexed,
            "Separation" => ColorSpace::Separation,
            "DeviceN" => ColorSpace::DeviceN { components: 1 },
            "Pattern" => ColorSpace::Pattern,
            _ => return None,
        };
        Some(space)
    }

    /// Canonical PDF family name.
    pub fn name(&self) -> &'static str {
        match self {
            ColorSpace::DeviceGray => "DeviceGray",
            ColorSpace::DeviceRgb => "DeviceRGB",
            ColorSpace::DeviceCmyk => "DeviceCMYK",
            ColorSpace::CalGray => "CalGray",
            ColorSpace::CalRgb => "CalRGB",
            ColorSpace::Lab => "Lab",
            ColorSpace::IccBased { .. } => "ICCBased",
            ColorSpace::Indexed => "Indexed",
            ColorSpace::Separation => "Separation",
            ColorSpace::DeviceN { .. } => "DeviceN",
            ColorSpace::Pattern => "Pattern",
        }
    }

    /// Number of numeric operands a `SC`/`sc` color in this space takes.
    pub fn components(&self) -> usize {
        match self {
            ColorSpace::DeviceGray | ColorSpace::CalGray => 1,
            ColorSpace::Indexed | ColorSpace::Separation => 1,
            ColorSpace::DeviceRgb | ColorSpace::CalRgb | ColorSpace::Lab => 3,
            ColorSpace::DeviceCmyk => 4,
            ColorSpace::IccBased { components } | ColorSpace::DeviceN { components } => {
                *components as usize
            }
            ColorSpace::Pattern => 0,
        }
    }

    /// Whether operands in this space are converted to a color value.
    pub fn is_device(&self) -> bool {
        matches!(
            self,
            ColorSpace::DeviceGray | ColorSpace::DeviceRgb | ColorSpace::DeviceCmyk
        )
    }

    /// The color a `CS`/`cs` selection of this space resets to.
    pub fn initial_color(&self) -> Color {
        match self {
            ColorSpace::DeviceGray => Color::Gray(0.0),
            ColorSpace::DeviceRgb => Color::Rgb(0.0, 0.0, 0.0),
            ColorSpace::DeviceCmyk => Color::Cmyk(0.0, 0.0, 0.0, 1.0),
            _ => Color::Named(X11Color::BLACK),
        }
    }

    /// Build a color from numeric components.
    ///
    /// Device spaces need exactly their component count; anything else
    /// yields the space's initial color.
    pub fn color_from_components(&self, components: &[f64]) -> Color {
        match (self, components) {
            (ColorSpace::DeviceGray, [g]) => Color::Gray(*g),
            (ColorSpace::DeviceRgb, [r, g, b]) => Color::Rgb(*r, *g, *b),
            (ColorSpace::DeviceCmyk, [c, m, y, k]) => Color::Cmyk(*c, *m, *y, *k),
            _ => self.initial_color(),
        }
    }
}

/// Handle into the fixed X11 color table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct X11Color(u16);

impl X11Color {
    pub const BLACK: X11Color = X11Color(0);
    pub const WHITE: X11Color = X11Color(1);
    pub const RED: X11Color = X11Color(2);
    pub const LIME: X11Color = X11Color(3);
    pub const BLUE: X11Color = X11Color(4);

    /// Look up a color by case-insensitive X11 name.
    pub fn from_name(name: &str) -> Option<Self> {
        X11_COLORS
            .iter()
            .position(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|i| X11Color(i as u16))
    }

    /// Closest table entry to an RGB byte triple (squared distance).
    pub fn nearest(rgb: [u8; 3]) -> Self {
        let dist = |c: &[u8; 3]| -> u32 {
            c.iter()
                .zip(rgb.iter())
                .map(|(a, b)| {
                    let d = *a as i32 - *b as i32;
                    (d * d) as u32
                })
                .sum()
        };
        let index = X11_COLORS
            .iter()
            .enumerate()
            .min_by_key(|(_, (_, c))| dist(c))
            .map_or(0, |(i, _)| i);
        X11Color(index as u16)
    }

    pub fn name(&self) -> &'static str {
        X11_COLORS[self.index()].0
    }

    pub fn rgb8(&self) -> [u8; 3] {
        X11_COLORS[self.index()].1
    }

    fn index(&self) -> usize {
        (self.0 as usize).min(X11_COLORS.len() - 1)
    }
}

#[rustfmt::skip]
static X11_COLORS: &[(&str, [u8; 3])] = &[
    // first entries are referenced by the associated constants
    ("black", [0, 0, 0]), ("white", [255, 255, 255]), ("red", [255, 0, 0]),
    ("lime", [0, 255, 0]), ("blue", [0, 0, 255]),
    ("aliceblue", [240, 248, 255]), ("antiquewhite", [250, 235, 215]), ("aqua", [0, 255, 255]),
    ("aquamarine", [127, 255, 212]), ("azure", [240, 255, 255]), ("beige", [245, 245, 220]),
    ("bisque", [255, 228, 196]), ("blanchedalmond", [255, 235, 205]), ("blueviolet", [138, 43, 226]),
    ("brown", [165, 42, 42]), ("burlywood", [222, 184, 135]), ("cadetblue", [95, 158, 160]),
    ("chartreuse", [127, 255, 0]), ("chocolate", [210, 105, 30]), ("coral", [255, 127, 80]),
    ("cornflowerblue", [100, 149, 237]), ("cornsilk", [255, 248, 220]), ("crimson", [220, 20, 60]),
    ("cyan", [0, 255, 255]), ("darkblue", [0, 0, 139]), ("darkcyan", [0, 139, 139]),
    ("darkgoldenrod", [184, 134, 11]), ("darkgray", [169, 169, 169]), ("darkgreen", [0, 100, 0]),
    ("darkkhaki", [189, 183, 107]), ("darkmagenta", [139, 0, 139]), ("darkolivegreen", [85, 107, 47]),
    ("darkorange", [255, 140, 0]), ("darkorchid", [153, 50, 204]), ("darkred", [139, 0, 0]),
    ("darksalmon", [233, 150, 122]), ("darkseagreen", [143, 188, 143]), ("darkslateblue", [72, 61, 139]),
    ("darkslategray", [47, 79, 79]), ("darkturquoise", [0, 206, 209]), ("darkviolet", [148, 0, 211]),
    ("deeppink", [255, 20, 147]), ("deepskyblue", [0, 191, 255]), ("dimgray", [105, 105, 105]),
    ("dodgerblue", [30, 144, 255]), ("firebrick", [178, 34, 34]), ("floralwhite", [255, 250, 240]),
    ("forestgreen", [34, 139, 34]), ("fuchsia", [255, 0, 255]), ("gainsboro", [220, 220, 220]),
    ("ghostwhite", [248, 248, 255]), ("gold", [255, 215, 0]), ("goldenrod", [218, 165, 32]),
    ("gray", [190, 190, 190]), ("green", [0, 255, 0]), ("greenyellow", [173, 255, 47]),
    ("honeydew", [240, 255, 240]), ("hotpink", [255, 105, 180]), ("indianred", [205, 92, 92]),
    ("indigo", [75, 0, 130]), ("ivory", [255, 255, 240]), ("khaki", [240, 230, 140]),
    ("lavender", [230, 230, 250]), ("lavenderblush", [255, 240, 245]), ("lawngreen", [124, 252, 0]),
    ("lemonchiffon", [255, 250, 205]), ("lightblue", [173, 216, 230]), ("lightcoral", [240, 128, 128]),
    ("lightcyan", [224, 255, 255]), ("lightgoldenrodyellow", [250, 250, 210]), ("lightgray", [211, 211, 211]),
    ("lightgreen", [144, 238, 144]), ("lightpink", [255, 182, 193]), ("lightsalmon", [255, 160, 122]),
    ("lightseagreen", [32, 178, 170]), ("lightskyblue", [135, 206, 250]), ("lightslategray", [119, 136, 153]),
    ("lightsteelblue", [176, 196, 222]), ("lightyellow", [255, 255, 224]), ("limegreen", [50, 205, 50]),
    ("linen", [250, 240, 230]), ("magenta", [255, 0, 255]), ("maroon", [176, 48, 96]),
    ("mediumaquamarine", [102, 205, 170]), ("mediumblue", [0, 0, 205]), ("mediumorchid", [186, 85, 211]),
    ("mediumpurple", [147, 112, 219]), ("mediumseagreen", [60, 179, 113]), ("mediumslateblue", [123, 104, 238]),
    ("mediumspringgreen", [0, 250, 154]), ("mediumturquoise", [72, 209, 204]), ("mediumvioletred", [199, 21, 133]),
    ("midnightblue", [25, 25, 112]), ("mintcream", [245, 255, 250]), ("mistyrose", [255, 228, 225]),
    ("moccasin", [255, 228, 181]), ("navajowhite", [255, 222, 173]), ("navy", [0, 0, 128]),
    ("oldlace", [253, 245, 230]), ("olive", [128, 128, 0]), ("olivedrab", [107, 142, 35]),
    ("orange", [255, 165, 0]), ("orangered", [255, 69, 0]), ("orchid", [218, 112, 214]),
    ("palegoldenrod", [238, 232, 170]), ("palegreen", [152, 251, 152]), ("paleturquoise", [175, 238, 238]),
    ("palevioletred", [219, 112, 147]), ("papayawhip", [255, 239, 213]), ("peachpuff", [255, 218, 185]),
    ("peru", [205, 133, 63]), ("pink", [255, 192, 203]), ("plum", [221, 160, 221]),
    ("powderblue", [176, 224, 230]), ("purple", [160, 32, 240]), ("rosybrown", [188, 143, 143]),
    ("royalblue", [65, 105, 225]), ("saddlebrown", [139, 69, 19]), ("salmon", [250, 128, 114]),
    ("sandybrown", [244, 164, 96]), ("seagreen", [46, 139, 87]), ("seashell", [255, 245, 238]),
    ("sienna", [160, 82, 45]), ("silver", [192, 192, 192]), ("skyblue", [135, 206, 235]),
    ("slateblue", [106, 90, 205]), ("slategray", [112, 128, 144]), ("snow", [255, 250, 250]),
    ("springgreen", [0, 255, 127]), ("steelblue", [70, 130, 180]), ("tan", [210, 180, 140]),
    ("teal", [0, 128, 128]), ("thistle", [216, 191, 216]), ("tomato", [255, 99, 71]),
    ("turquoise", [64, 224, 208]), ("violet", [238, 130, 238]), ("wheat", [245, 222, 179]),
    ("whitesmoke", [245, 245, 245]), ("yellow", [255, 255, 0]), ("yellowgreen", [154, 205, 50]),
];

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_rgb_approx(actual: (f64, f64, f64), expected: (f64, f64, f64)) {
        assert!((actual.0 - expected.0).abs() < 1e-10, "{actual:?} != {expected:?}");
        assert!((actual.1 - expected.1).abs() < 1e-10, "{actual:?} != {expected:?}");
        assert!((actual.2 - expected.2).abs() < 1e-10, "{actual:?} != {expected:?}");
    }

    #[test]
    fn gray_replicates_channel() {
        assert_rgb_approx(Color::Gray(0.25).to_rgb(), (0.25, 0.25, 0.25));
    }

    #[test]
    fn cmyk_to_rgb_formula() {
        assert_rgb_approx(Color::Cmyk(0.0, 0.0, 0.0, 1.0).to_rgb(), (0.0, 0.0, 0.0));
        assert_rgb_approx(Color::Cmyk(1.0, 0.0, 0.0, 0.0).to_rgb(), (0.0, 1.0, 1.0));
        assert_rgb_approx(Color::Cmyk(0.5, 0.0, 0.0, 0.5).to_rgb(), (0.25, 0.5, 0.5));
    }

    #[test]
    fn rgb_is_clamped() {
        assert_rgb_approx(Color::Rgb(1.5, -0.2, 0.5).to_rgb(), (1.0, 0.0, 0.5));
    }

    #[test]
    fn rgb8_conversion() {
        assert_eq!(Color::Rgb(0.0, 0.0, 1.0).to_rgb8(), [0, 0, 255]);
        assert_eq!(Color::Named(X11Color::RED).to_rgb8(), [255, 0, 0]);
    }

    #[test]
    fn x11_lookup_by_name() {
        let c = X11Color::from_name("CornflowerBlue").unwrap();
        assert_eq!(c.name(), "cornflowerblue");
        assert_eq!(c.rgb8(), [100, 149, 237]);
        assert!(X11Color::from_name("not-a-color").is_none());
    }

    #[test]
    fn x11_constants_resolve() {
        assert_eq!(X11Color::BLACK.name(), "black");
        assert_eq!(X11Color::WHITE.rgb8(), [255, 255, 255]);
        assert_eq!(X11Color::BLUE.rgb8(), [0, 0, 255]);
    }

    #[test]
    fn x11_nearest() {
        assert_eq!(X11Color::nearest([1, 1, 2]), X11Color::BLACK);
        assert_eq!(X11Color::nearest([250, 2, 3]), X11Color::RED);
    }

    #[test]
    fn color_space_from_name() {
        assert_eq!(ColorSpace::from_name("DeviceRGB"), Some(ColorSpace::DeviceRgb));
        assert_eq!(ColorSpace::from_name("G"), Some(ColorSpace::DeviceGray));
        assert_eq!(ColorSpace::from_name("Foo"), None);
    }

    #[test]
    fn color_space_components() {
        assert_eq!(ColorSpace::DeviceGray.components(), 1);
        assert_eq!(ColorSpace::DeviceRgb.components(), 3);
        assert_eq!(ColorSpace::DeviceCmyk.components(), 4);
        assert_eq!(ColorSpace::IccBased { components: 4 }.components(), 4);
        assert_eq!(ColorSpace::Pattern.components(), 0);
    }

    #[test]
    fn initial_colors() {
        assert_eq!(ColorSpace::DeviceGray.initial_color(), Color::Gray(0.0));
        assert_eq!(ColorSpace::DeviceRgb.initial_color(), Color::Rgb(0.0, 0.0, 0.0));
        assert_eq!(ColorSpace::DeviceCmyk.initial_color(), Color::Cmyk(0.0, 0.0, 0.0, 1.0));
        assert_eq!(
            ColorSpace::Separation.initial_color(),
            Color::Named(X11Color::BLACK)
        );
    }

    #[test]
    fn non_device_spaces_ignore_components() {
        let c = ColorSpace::Lab.color_from_components(&[50.0, 10.0, 10.0]);
        assert_eq!(c, Color::Named(X11Color::BLACK));
        let c = ColorSpace::DeviceRgb.color_from_components(&[0.1, 0.2, 0.3]);
        assert_eq!(c, Color::Rgb(0.1, 0.2, 0.3));
    }

    #[test]
    fn wrong_arity_falls_back_to_initial() {
        let c = ColorSpace::DeviceCmyk.color_from_components(&[0.1, 0.2]);
        assert_eq!(c, Color::Cmyk(0.0, 0.0, 0.0, 1.0));
    }
}
