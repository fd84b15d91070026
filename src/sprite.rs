//! Sprite handling: the image-URL fallback chain shared by every view, and
//! decoding fetched images into kitty graphics sequences for the terminal.

use base64::Engine as _;
use serde::{Deserialize, Serialize};

use crate::state::PokemonRecord;

const SPRITE_REPO: &str = "https://raw.githubusercontent.com/PokeAPI/sprites/master/sprites/pokemon";

/// Cosmetic-variant families whose forms lack their own sprites; each maps to
/// the canonical representative's id. Checked in order; a row fires only when
/// the name contains the family substring and is not the bare family name
/// itself.
const VARIANT_SPRITES: &[(&str, u16)] = &[
    ("koraidon", 1007),
    ("miraidon", 1008),
    ("pikachu", 25),
    ("toxtricity", 849),
    ("morpeko", 877),
    ("voltorb-hisui", 100),
    ("electrode-hisui", 101),
    ("togedemaru", 777),
];

/// Best displayable image URL for a record. Tries the catalog's references in
/// fixed order, then the variant table, then the id-templated sprite path.
/// Total: always returns some URL.
pub fn display_url(record: &PokemonRecord) -> String {
    let refs = &record.sprites;
    [
        refs.front_default.as_deref(),
        refs.home.as_deref(),
        refs.official_artwork.as_deref(),
        refs.front_shiny.as_deref(),
    ]
    .into_iter()
    .flatten()
    .find(|url| !url.is_empty())
    .map(str::to_string)
    .unwrap_or_else(|| fallback_url(record))
}

/// Name-pattern/id fallback alone, skipping the catalog references. Used both
/// as the tail of [`display_url`] and as the one-shot substitute when the
/// displayed URL fails to load.
pub fn fallback_url(record: &PokemonRecord) -> String {
    for (family, canonical_id) in VARIANT_SPRITES {
        if record.name.contains(family) && record.name != *family {
            return format!("{SPRITE_REPO}/{canonical_id}.png");
        }
    }
    format!("{SPRITE_REPO}/{}.png", record.id)
}

/// A decoded sprite: RGBA pixels ready for kitty transmission.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SpriteData {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

pub fn decode_sprite(bytes: &[u8]) -> Result<SpriteData, String> {
    let image = image::load_from_memory(bytes).map_err(|err| err.to_string())?;
    let rgba = image.to_rgba8();
    Ok(SpriteData {
        width: rgba.width(),
        height: rgba.height(),
        rgba: rgba.into_raw(),
    })
}

/// Kitty graphics escape sequence placing the sprite into a cols x rows cell
/// box at the cursor position. Payload is chunked per the protocol.
pub fn kitty_sequence(sprite: &SpriteData, cols: u16, rows: u16) -> Result<String, String> {
    if sprite.rgba.is_empty() {
        return Err("empty sprite".to_string());
    }
    let payload = base64::engine::general_purpose::STANDARD.encode(&sprite.rgba);
    let mut sequence = String::new();
    let mut chunks = payload.as_bytes().chunks(4096).peekable();
    let mut first = true;
    while let Some(chunk) = chunks.next() {
        let more = if chunks.peek().is_some() { 1 } else { 0 };
        let data = std::str::from_utf8(chunk).map_err(|err| err.to_string())?;
        if first {
            sequence.push_str(&format!(
                "\x1b_Gf=32,a=T,t=d,s={},v={},c={},r={},m={};{}\x1b\\",
                sprite.width, sprite.height, cols, rows, more, data
            ));
            first = false;
        } else {
            sequence.push_str(&format!("\x1b_Gm={};{}\x1b\\", more, data));
        }
    }
    Ok(sequence)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::SpriteRefs;
    use pretty_assertions::assert_eq;

    fn record(id: u16, name: &str, sprites: SpriteRefs) -> PokemonRecord {
        PokemonRecord {
            id,
            name: name.to_string(),
            height: 4,
            weight: 60,
            types: vec!["electric".to_string()],
            stats: Vec::new(),
            sprites,
        }
    }

    #[test]
    fn front_default_wins() {
        let sprites = SpriteRefs {
            front_default: Some("https://example.test/front.png".to_string()),
            front_shiny: Some("https://example.test/shiny.png".to_string()),
            home: Some("https://example.test/home.png".to_string()),
            official_artwork: Some("https://example.test/art.png".to_string()),
        };
        let url = display_url(&record(25, "pikachu", sprites));
        assert_eq!(url, "https://example.test/front.png");
    }

    #[test]
    fn reference_order_is_home_then_artwork_then_shiny() {
        let sprites = SpriteRefs {
            front_default: None,
            front_shiny: Some("https://example.test/shiny.png".to_string()),
            home: Some("https://example.test/home.png".to_string()),
            official_artwork: Some("https://example.test/art.png".to_string()),
        };
        assert_eq!(
            display_url(&record(25, "pikachu", sprites.clone())),
            "https://example.test/home.png"
        );

        let no_home = SpriteRefs {
            home: None,
            ..sprites.clone()
        };
        assert_eq!(
            display_url(&record(25, "pikachu", no_home)),
            "https://example.test/art.png"
        );

        let shiny_only = SpriteRefs {
            front_shiny: sprites.front_shiny,
            ..SpriteRefs::default()
        };
        assert_eq!(
            display_url(&record(25, "pikachu", shiny_only)),
            "https://example.test/shiny.png"
        );
    }

    #[test]
    fn empty_reference_is_treated_as_absent() {
        let sprites = SpriteRefs {
            front_default: Some(String::new()),
            front_shiny: Some("https://example.test/shiny.png".to_string()),
            ..SpriteRefs::default()
        };
        assert_eq!(
            display_url(&record(25, "pikachu", sprites)),
            "https://example.test/shiny.png"
        );
    }

    #[test]
    fn variant_family_maps_to_canonical_sprite() {
        let url = display_url(&record(10279, "pikachu-rock-star", SpriteRefs::default()));
        assert_eq!(
            url,
            "https://raw.githubusercontent.com/PokeAPI/sprites/master/sprites/pokemon/25.png"
        );

        let url = display_url(&record(10264, "koraidon-limited-build", SpriteRefs::default()));
        assert_eq!(
            url,
            "https://raw.githubusercontent.com/PokeAPI/sprites/master/sprites/pokemon/1007.png"
        );
    }

    #[test]
    fn bare_family_name_skips_the_table() {
        let url = display_url(&record(849, "toxtricity", SpriteRefs::default()));
        assert_eq!(
            url,
            "https://raw.githubusercontent.com/PokeAPI/sprites/master/sprites/pokemon/849.png"
        );
    }

    #[test]
    fn unknown_record_falls_back_to_id_template() {
        let url = display_url(&record(132, "ditto", SpriteRefs::default()));
        assert_eq!(
            url,
            "https://raw.githubusercontent.com/PokeAPI/sprites/master/sprites/pokemon/132.png"
        );
        assert!(!url.is_empty());
    }
}
