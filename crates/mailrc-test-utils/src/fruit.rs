//! The fruit variables
//!
//! One expando variable per scenario, all compiled against
//! [`TEST_FORMAT_DEFS`]. The comments name what each group exercises.

use mailrc_core::{ConfigDef, ConfigSet, DefFlags, TypeTag};
use mailrc_expando::ExpandoDefinition;

use crate::validators::{self, Gate};

/// Directive table with the codes `a`, `b` and `c`
pub static TEST_FORMAT_DEFS: &[ExpandoDefinition] = &[
    ExpandoDefinition::new("a", "aardvark", 1, 100),
    ExpandoDefinition::new("b", "badger", 1, 101),
    ExpandoDefinition::new("c", "cat", 1, 102),
];

fn fruit(name: &str, initial: &str) -> ConfigDef {
    ConfigDef::new(name, TypeTag::EXPANDO)
        .initial(initial)
        .expando_defs(TEST_FORMAT_DEFS)
}

/// The fruit definitions. `Olive` and `Raspberry` refuse every value
/// unless `gate` is open.
pub fn fruit_definitions(gate: &Gate) -> Vec<ConfigDef> {
    vec![
        // initial values
        fruit("Apple", "apple"),
        fruit("Banana", "banana"),
        fruit("Cherry", "cherry"),
        // string_set
        fruit("Damson", ""),
        fruit("Elderberry", "elderberry"),
        fruit("Fig", "fig").flags(DefFlags::NOT_EMPTY),
        // string_get
        fruit("Guava", ""),
        fruit("Hawthorn", "hawthorn"),
        fruit("Ilama", ""),
        // native_set
        fruit("Jackfruit", ""),
        fruit("Kumquat", "kumquat"),
        fruit("Lemon", "lemon").flags(DefFlags::NOT_EMPTY),
        // native_get
        fruit("Mango", ""),
        // reset
        fruit("Nectarine", "nectarine"),
        fruit("Olive", "olive").validator(validators::gated(gate)),
        // validators
        fruit("Papaya", "papaya").validator(validators::succeed),
        fruit("Quince", "quince").validator(validators::warn),
        fruit("Raspberry", "raspberry").validator(validators::gated(gate)),
        // inheritance
        fruit("Strawberry", ""),
        fruit("Tangerine", "tangerine"),
        // startup lock
        fruit("Wolfberry", "wolfberry").flags(DefFlags::ON_STARTUP),
    ]
}

/// A registry holding the fruit variables, with startup complete.
#[derive(Debug)]
pub struct FruitFixture {
    pub cs: ConfigSet,
    pub gate: Gate,
}

impl Default for FruitFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl FruitFixture {
    pub fn new() -> Self {
        let gate = Gate::new();
        let mut cs = ConfigSet::new();
        cs.set_startup_complete(false);
        cs.register(fruit_definitions(&gate))
            .expect("FruitFixture: fruit definitions must register");
        cs.set_startup_complete(true);
        Self { cs, gate }
    }

    /// Current text of a variable, panicking on lookup errors.
    pub fn get(&self, name: &str) -> String {
        self.cs
            .string_get(name)
            .unwrap_or_else(|e| panic!("FruitFixture::get({name}): {e}"))
    }
}
