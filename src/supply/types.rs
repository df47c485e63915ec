//! Filter sections and the loads they feed.

use std::fmt;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::units::parse_resistance;

/// Transformer secondary DCR assumed when a power load omits it [Ω].
pub const DEFAULT_TRANSFORMER_DCR: f64 = 100.0;

/// Screen grid resistor assumed when a g2 load omits it [Ω].
pub const DEFAULT_SCREEN_RESISTOR: f64 = 470.0;

/// Anode resistor assumed for inverter and preamp stages [Ω].
pub const DEFAULT_ANODE_RESISTOR: f64 = 100_000.0;

/// Cathode resistor assumed for preamp stages [Ω].
pub const DEFAULT_CATHODE_RESISTOR: f64 = 1_500.0;

/// Which series element sits between this node and the previous one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterType {
    /// Resistor + capacitor (first-order)
    #[default]
    RC,
    /// Choke + capacitor (second-order)
    LC,
}

impl fmt::Display for FilterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterType::RC => f.write_str("RC"),
            FilterType::LC => f.write_str("LC"),
        }
    }
}

/// The active series element of a section.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FilterElement {
    /// Series resistor [Ω]
    Resistor(f64),
    /// Series choke [H]
    Inductor(f64),
}

/// One stage of the B+ filter chain.
///
/// Exactly one of `resistance`/`inductance` is meaningful, selected by
/// `filter_type`; the other is carried along so switching type in an
/// editor does not lose the value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    /// Stable identifier, unique within a chain
    #[serde(default)]
    pub id: u64,
    /// Single-letter label (A, B, C, ...)
    #[serde(default)]
    pub name: String,
    #[serde(rename = "filterType", default)]
    pub filter_type: FilterType,
    /// Series resistance [Ω]
    #[serde(rename = "R", default, deserialize_with = "deserialize_ohms")]
    pub resistance: f64,
    /// Choke inductance [H]
    #[serde(rename = "L", default, skip_serializing_if = "Option::is_none")]
    pub inductance: Option<f64>,
    /// Filter capacitance [µF]
    #[serde(rename = "C", default)]
    pub capacitance: f64,
    /// What this node powers
    #[serde(default)]
    pub load: Option<Load>,
}

impl Section {
    /// Create an RC section.
    pub fn rc(id: u64, name: impl Into<String>, resistance: f64, capacitance: f64, load: Load) -> Self {
        Self {
            id,
            name: name.into(),
            filter_type: FilterType::RC,
            resistance,
            inductance: None,
            capacitance,
            load: Some(load),
        }
    }

    /// Create an LC section.
    pub fn lc(id: u64, name: impl Into<String>, inductance: f64, capacitance: f64, load: Load) -> Self {
        Self {
            id,
            name: name.into(),
            filter_type: FilterType::LC,
            resistance: 0.0,
            inductance: Some(inductance),
            capacitance,
            load: Some(load),
        }
    }

    /// The series element selected by `filter_type`.
    pub fn filter_element(&self) -> FilterElement {
        match self.filter_type {
            FilterType::RC => FilterElement::Resistor(self.resistance),
            FilterType::LC => FilterElement::Inductor(self.inductance.unwrap_or(0.0)),
        }
    }

    /// DC resistance of the series element, using `coil_dcr` for chokes.
    pub fn series_resistance(&self, coil_dcr: f64) -> f64 {
        match self.filter_element() {
            FilterElement::Resistor(r) => r,
            FilterElement::Inductor(_) => coil_dcr,
        }
    }
}

/// A resistance as saved by an editor: a number, or the text typed into the
/// field ("4k7", "100k", "").
#[derive(Deserialize)]
#[serde(untagged)]
enum Ohms {
    Number(f64),
    Text(String),
}

impl Ohms {
    fn into_ohms(self) -> f64 {
        match self {
            Ohms::Number(value) => value,
            Ohms::Text(text) => parse_resistance(&text),
        }
    }
}

/// Accept either a number or resistor shorthand ("4k7") for `R`.
fn deserialize_ohms<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Ohms::deserialize(deserializer)?.into_ohms())
}

/// Optional resistance, number or shorthand.
fn deserialize_opt_ohms<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Ohms>::deserialize(deserializer)?.map(Ohms::into_ohms))
}

/// Optional list of resistances; null entries read as zero.
fn deserialize_opt_ohms_list<'de, D>(deserializer: D) -> std::result::Result<Option<Vec<f64>>, D::Error>
where
    D: Deserializer<'de>,
{
    let list = Option::<Vec<Option<Ohms>>>::deserialize(deserializer)?;
    Ok(list.map(|values| {
        values
            .into_iter()
            .map(|value| value.map_or(0.0, Ohms::into_ohms))
            .collect()
    }))
}

/// The circuit a section supplies.
///
/// Every model matches on this exhaustively, so a new kind of load has to
/// be handled everywhere before the crate compiles.
///
/// Serialized as an object tagged by `type`. Objects with any other `type`
/// (or none) are kept verbatim in [`Load::Other`].
#[derive(Debug, Clone, PartialEq)]
pub enum Load {
    /// Output tube anodes (and screens, via the output transformer)
    Power(PowerLoad),
    /// Output tube screen grids through a dropping resistor
    G2(ScreenLoad),
    /// Phase inverter
    Inverter(InverterLoad),
    /// Preamp gain stages
    Preamp(PreampLoad),
    /// A load type this version does not model; draws nothing
    Other(OtherLoad),
}

/// The modelled load kinds, as they appear on the wire.
#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum KnownLoad {
    Power(PowerLoad),
    G2(ScreenLoad),
    Inverter(InverterLoad),
    Preamp(PreampLoad),
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum KnownLoadRef<'a> {
    Power(&'a PowerLoad),
    G2(&'a ScreenLoad),
    Inverter(&'a InverterLoad),
    Preamp(&'a PreampLoad),
}

const KNOWN_LOAD_TYPES: [&str; 4] = ["power", "g2", "inverter", "preamp"];

impl<'de> Deserialize<'de> for Load {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let fields = Map::<String, Value>::deserialize(deserializer)?;
        let known = fields
            .get("type")
            .and_then(Value::as_str)
            .is_some_and(|kind| KNOWN_LOAD_TYPES.contains(&kind));

        if !known {
            return Ok(Load::Other(OtherLoad { fields }));
        }

        let load: KnownLoad = serde_json::from_value(Value::Object(fields)).map_err(D::Error::custom)?;
        Ok(match load {
            KnownLoad::Power(power) => Load::Power(power),
            KnownLoad::G2(screen) => Load::G2(screen),
            KnownLoad::Inverter(inverter) => Load::Inverter(inverter),
            KnownLoad::Preamp(preamp) => Load::Preamp(preamp),
        })
    }
}

impl Serialize for Load {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let known = match self {
            Load::Power(power) => KnownLoadRef::Power(power),
            Load::G2(screen) => KnownLoadRef::G2(screen),
            Load::Inverter(inverter) => KnownLoadRef::Inverter(inverter),
            Load::Preamp(preamp) => KnownLoadRef::Preamp(preamp),
            Load::Other(other) => return other.fields.serialize(serializer),
        };
        known.serialize(serializer)
    }
}

/// A load descriptor of a kind the calculator does not model, such as a
/// negative bias supply. Carried through import and export unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OtherLoad {
    /// The descriptor object as read, `type` included
    pub fields: Map<String, Value>,
}

impl OtherLoad {
    /// A descriptor with only a `type` tag.
    pub fn new(kind: impl Into<String>) -> Self {
        let mut fields = Map::new();
        fields.insert("type".to_string(), Value::String(kind.into()));
        Self { fields }
    }

    /// The `type` tag, if the descriptor has a string one.
    pub fn kind(&self) -> Option<&str> {
        self.fields.get("type").and_then(Value::as_str)
    }
}

impl Load {
    /// Output stage with the standard transformer DCR.
    pub fn power(tubes: impl Into<String>, config: impl Into<String>) -> Self {
        Load::Power(PowerLoad {
            tubes: tubes.into(),
            config: config.into(),
            dcr: Some(DEFAULT_TRANSFORMER_DCR),
        })
    }

    /// Screen supply with the standard 470 Ω resistor.
    pub fn g2(tubes: impl Into<String>, config: impl Into<String>) -> Self {
        Load::G2(ScreenLoad {
            tubes: tubes.into(),
            config: config.into(),
            resistor: Some(DEFAULT_SCREEN_RESISTOR),
            separate: false,
        })
    }

    /// Phase inverter with 100k anode resistors.
    pub fn inverter(inverter_type: impl Into<String>) -> Self {
        Load::Inverter(InverterLoad {
            inverter_type: inverter_type.into(),
            anode_resistor: Some(DEFAULT_ANODE_RESISTOR),
        })
    }

    /// `count` dual triodes sharing a 100k anode resistor value.
    pub fn preamp(tubes: impl Into<String>, count: u32) -> Self {
        Load::Preamp(PreampLoad {
            tubes: tubes.into(),
            count,
            anode_resistor: Some(DEFAULT_ANODE_RESISTOR),
            cathode_resistor: None,
            separate_ra: false,
            anode_resistors: None,
            triode_currents: None,
        })
    }

    /// Negative bias supply. Not modelled, so it draws nothing from B+.
    pub fn bias(description: impl Into<String>) -> Self {
        let mut other = OtherLoad::new("bias");
        other
            .fields
            .insert("description".to_string(), Value::String(description.into()));
        Load::Other(other)
    }

    /// Short human-readable description ("Push-Pull EL34", "2× 12AX7").
    pub fn description(&self) -> String {
        match self {
            Load::Power(p) => format!("{} {}", p.config, p.tubes),
            Load::G2(g) => format!("G2 {}", g.tubes),
            Load::Inverter(i) => i.inverter_type.clone(),
            Load::Preamp(p) => format!("{}× {}", p.count, p.tubes),
            Load::Other(_) => String::new(),
        }
    }
}

/// Output tubes fed from this node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerLoad {
    /// Power tube name
    pub tubes: String,
    /// Configuration name ("Push-Pull", ...)
    pub config: String,
    /// Output transformer primary DCR [Ω]
    #[serde(default, deserialize_with = "deserialize_opt_ohms", skip_serializing_if = "Option::is_none")]
    pub dcr: Option<f64>,
}

impl PowerLoad {
    pub fn dcr(&self) -> f64 {
        self.dcr.unwrap_or(DEFAULT_TRANSFORMER_DCR)
    }
}

/// Screen grids fed from this node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenLoad {
    pub tubes: String,
    pub config: String,
    /// Screen dropping resistor [Ω]
    #[serde(default, deserialize_with = "deserialize_opt_ohms", skip_serializing_if = "Option::is_none")]
    pub resistor: Option<f64>,
    /// One resistor per tube instead of a shared one
    #[serde(default, skip_serializing_if = "is_false")]
    pub separate: bool,
}

impl ScreenLoad {
    pub fn resistor(&self) -> f64 {
        self.resistor.unwrap_or(DEFAULT_SCREEN_RESISTOR)
    }
}

/// Phase inverter fed from this node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InverterLoad {
    /// Topology name ("Long-tail pair", ...)
    #[serde(rename = "inverterType")]
    pub inverter_type: String,
    /// Anode resistor [Ω]
    #[serde(rename = "Ra", default, deserialize_with = "deserialize_opt_ohms", skip_serializing_if = "Option::is_none")]
    pub anode_resistor: Option<f64>,
}

impl InverterLoad {
    pub fn anode_resistor(&self) -> f64 {
        self.anode_resistor.unwrap_or(DEFAULT_ANODE_RESISTOR)
    }
}

/// Preamp dual triodes fed from this node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreampLoad {
    pub tubes: String,
    /// Number of dual-triode tubes (two triodes each)
    #[serde(default = "default_tube_count")]
    pub count: u32,
    /// Shared anode resistor [Ω]
    #[serde(rename = "Ra", default, deserialize_with = "deserialize_opt_ohms", skip_serializing_if = "Option::is_none")]
    pub anode_resistor: Option<f64>,
    /// Cathode resistor [Ω]
    #[serde(rename = "Rk", default, deserialize_with = "deserialize_opt_ohms", skip_serializing_if = "Option::is_none")]
    pub cathode_resistor: Option<f64>,
    /// Each triode has its own anode resistor
    #[serde(rename = "separateRa", default, skip_serializing_if = "is_false")]
    pub separate_ra: bool,
    /// Per-triode anode resistors [Ω], used in separate mode
    #[serde(
        rename = "RaArray",
        default,
        deserialize_with = "deserialize_opt_ohms_list",
        skip_serializing_if = "Option::is_none"
    )]
    pub anode_resistors: Option<Vec<f64>>,
    /// Per-triode anode currents [mA], used in separate mode
    #[serde(rename = "IaArray", default, skip_serializing_if = "Option::is_none")]
    pub triode_currents: Option<Vec<f64>>,
}

impl PreampLoad {
    pub fn anode_resistor(&self) -> f64 {
        self.anode_resistor.unwrap_or(DEFAULT_ANODE_RESISTOR)
    }

    pub fn cathode_resistor(&self) -> f64 {
        self.cathode_resistor.unwrap_or(DEFAULT_CATHODE_RESISTOR)
    }

    /// Two triodes per envelope.
    pub fn triode_count(&self) -> u32 {
        self.count.saturating_mul(2)
    }

    /// Explicit per-triode currents, if separate mode supplies them.
    pub fn explicit_currents(&self) -> Option<&[f64]> {
        if self.separate_ra {
            self.triode_currents.as_deref()
        } else {
            None
        }
    }
}

fn default_tube_count() -> u32 {
    1
}

fn is_false(value: &bool) -> bool {
    !*value
}
