//! Sample data for the demo binary and integration tests
//!
//! German surnames with English meanings. Either name may be missing; no
//! row lacks both.

use uuid::Uuid;

use crate::backend::MemoryBackend;
use crate::catalog::{DataType, EntityDef, PropertyDef};
use crate::error::QueryResult;
use crate::executor::Datum;

/// `(EnglishName, GermanName)` pairs
pub const LOCALIZED_NAMES: &[(Option<&str>, Option<&str>)] = &[
    (Some("Faber"), None),
    (None, Some("dyer")),
    (Some("Fassbinder"), Some("cooper")),
    (Some("Faust"), Some("fist")),
    (Some("Feierabend"), None),
    (Some("Fenstermacher"), Some("window maker")),
    (Some("Fiedler"), Some("fiddler")),
    (None, Some("finch")),
    (Some("Fleischer"), Some("butcher")),
    (Some("Foerster"), Some("forester")),
    (Some("Frankfurter"), Some("of Frankfurt")),
    (None, Some("Friday")),
    (Some("Freud"), Some("joy")),
    (Some("Frei"), None),
    (Some("Freeh"), None),
    (Some("Fruehauf"), Some("up early")),
    (Some("Fuchs"), Some("fox")),
    (Some("Fuerst/Furst"), Some("prince")),
    (Some("Fuhrmann"), Some("carter, driver")),
    (None, Some("gardener")),
    (Some("Gerber"), Some("tanner")),
    (Some("Gerste/Gersten"), Some("barley")),
    (Some("Gloeckner/Glockner"), Some("bell man")),
    (Some("Gottschalk"), Some("God's servant")),
    (None, Some("green forest")),
    (Some("Hertz/Herz"), Some("heart")),
    (Some("Hertzog/Herzog"), Some("duke")),
    (None, Some("heaven")),
    (Some("Hirsch"), Some("buck, deer")),
    (Some("Hoch"), None),
    (Some("Jaeger"), None),
    (Some("Jung"), Some("young")),
    (Some("Junker"), Some("nobleman, squire")),
    (Some("Kaiser"), Some("emperor")),
    (Some("Kalb"), Some("calf")),
    (None, Some("cabinet maker")),
    (Some("Kappel"), Some("chapel")),
    (Some("Kaufmann"), Some("merchant")),
    (Some("Kirsch"), Some("cherry")),
    (Some("Klein"), Some("short, small")),
    (Some("Klug/Kluge"), None),
    (Some("Koch"), Some("cook")),
    (None, Some("charcoal-maker")),
    (Some("Koenig/Konig"), Some("king")),
    (Some("Krause"), Some("curly haired")),
    (Some("Kuefer"), Some("cooper")),
    (None, Some("sexton")),
    (Some("Kuhn/Kunze"), None),
];

/// Entity with a uuid id and two optional names
pub fn localized_entity() -> EntityDef {
    EntityDef::new("Entity")
        .id("Id", DataType::Uuid)
        .property(PropertyDef::new("EnglishName", DataType::Text))
        .property(PropertyDef::new("GermanName", DataType::Text))
}

/// Register `Entity` and insert every name pair `copies` times, each row
/// with a fresh id
pub fn load_localized_names(backend: &MemoryBackend, copies: usize) -> QueryResult<()> {
    backend.register(localized_entity())?;
    for _ in 0..copies {
        for (english, german) in LOCALIZED_NAMES {
            backend.insert(
                "Entity",
                [
                    ("Id", Datum::from(Uuid::new_v4())),
                    ("EnglishName", Datum::from(*english)),
                    ("GermanName", Datum::from(*german)),
                ],
            )?;
        }
    }
    Ok(())
}
