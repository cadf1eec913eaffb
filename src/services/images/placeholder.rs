use base64::{engine::general_purpose, Engine};
use sha2::{Digest, Sha256};

pub const SVG_DATA_URI_PREFIX: &str = "data:image/svg+xml;base64,";

const CAPTION: &str = "Delicious Food";

/// Warm gradient pairs; the dish name picks one.
const PALETTE: &[(&str, &str)] = &[
    ("#ff6b6b", "#ff5722"),
    ("#ffa726", "#f4511e"),
    ("#ef5350", "#ab47bc"),
    ("#66bb6a", "#00897b"),
    ("#ffca28", "#fb8c00"),
    ("#8d6e63", "#d84315"),
];

fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            c if c.is_control() => {}
            c => escaped.push(c),
        }
    }
    escaped
}

/// Same name, same colours.
fn gradient_for(dish_name: &str) -> (&'static str, String, &'static str) {
    let digest = Sha256::digest(dish_name.as_bytes());
    let (start, end) = PALETTE[digest[0] as usize % PALETTE.len()];
    // Middle stop is taken straight from the digest so near-identical names still differ.
    let middle = format!("#{}", hex::encode(&digest[1..4]));
    (start, middle, end)
}

/// 800×600 SVG card with the dish name over a gradient.
///
/// A blank name renders the caption alone.
pub fn placeholder_svg(dish_name: &str) -> String {
    let name = dish_name.trim();
    let (start, middle, end) = gradient_for(name);

    let title = if name.is_empty() {
        String::new()
    } else {
        format!(
            r#"<text x="400" y="340" font-family="Arial, sans-serif" font-size="28" font-weight="bold" text-anchor="middle" fill="white" filter="url(#shadow)">{}</text>"#,
            escape_xml(name)
        )
    };

    format!(
        r##"<svg width="800" height="600" xmlns="http://www.w3.org/2000/svg"><defs><linearGradient id="grad1" x1="0%" y1="0%" x2="100%" y2="100%"><stop offset="0%" style="stop-color:{start};stop-opacity:1"/><stop offset="50%" style="stop-color:{middle};stop-opacity:0.6"/><stop offset="100%" style="stop-color:{end};stop-opacity:1"/></linearGradient><filter id="shadow"><feDropShadow dx="2" dy="2" stdDeviation="3" flood-color="rgba(0,0,0,0.3)"/></filter></defs><rect width="800" height="600" fill="url(#grad1)"/><circle cx="400" cy="300" r="120" fill="white" opacity="0.2"/><circle cx="400" cy="300" r="80" fill="white" opacity="0.3"/><path d="M400 220 L420 240 L400 260 L380 240 Z" fill="white" opacity="0.8"/><circle cx="400" cy="280" r="15" fill="white" opacity="0.8"/>{title}<text x="400" y="370" font-family="Arial, sans-serif" font-size="16" text-anchor="middle" fill="white" opacity="0.9">{caption}</text></svg>"##,
        caption = CAPTION,
    )
}

pub fn placeholder_data_uri(dish_name: &str) -> String {
    let svg = placeholder_svg(dish_name);
    format!("{}{}", SVG_DATA_URI_PREFIX, general_purpose::STANDARD.encode(svg))
}

/// Decodes an inline placeholder back to SVG text.
pub fn decode_data_uri(data_uri: &str) -> Option<String> {
    let payload = data_uri.strip_prefix(SVG_DATA_URI_PREFIX)?;
    let bytes = general_purpose::STANDARD.decode(payload).ok()?;
    String::from_utf8(bytes).ok()
}
