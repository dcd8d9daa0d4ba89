//! Additive knowledge base
//!
//! Immutable table of additive records plus the known problematic
//! combinations. Entries are keyed either by an exact code (`E621`) or by an
//! inclusive numeric range (`E200-E203`). Lookup tries the exact key first and
//! then the ranges, so a specific entry inside a range always wins.
//!
//! The built-in table is constructed by [`AdditiveKnowledgeBase::builtin`];
//! tests and callers can build their own with [`AdditiveKnowledgeBase::new`].

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::{normalize_code, AdditiveInfo, ConcernLevel};

/// How a knowledge-base entry is matched
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AdditiveKey {
    Exact { code: String },
    Range { start: u32, end: u32 },
}

impl AdditiveKey {
    /// Parse `E621` or `E200-E203` (case-insensitive)
    pub fn parse(key: &str) -> Option<Self> {
        let key = normalize_code(key);
        if let Some((start, end)) = key.split_once('-') {
            let start = numeric_part(start)?;
            let end = numeric_part(end)?;
            if start > end {
                return None;
            }
            return Some(AdditiveKey::Range { start, end });
        }
        if key.is_empty() {
            return None;
        }
        Some(AdditiveKey::Exact { code: key })
    }
}

/// Numeric part of an E-number: `E150D` -> 150, `e1442` -> 1442
pub fn numeric_part(code: &str) -> Option<u32> {
    let code = code.trim();
    let rest = code
        .strip_prefix('E')
        .or_else(|| code.strip_prefix('e'))
        .unwrap_or(code);
    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

/// A set of additives that is problematic when at least two co-occur
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinationRule {
    pub id: String,
    pub codes: Vec<String>,
    pub message: String,
    /// Extra penalty (negative) applied once when the rule fires
    pub penalty: i32,
}

/// Immutable additive table
#[derive(Debug, Clone)]
pub struct AdditiveKnowledgeBase {
    entries: Vec<AdditiveInfo>,
    exact: HashMap<String, usize>,
    ranges: Vec<(u32, u32, usize)>,
    combinations: Vec<CombinationRule>,
}

impl AdditiveKnowledgeBase {
    /// Build a knowledge base. Each entry's `code` is its key; entries whose
    /// key does not parse are skipped with a warning. On duplicate exact keys
    /// the first entry wins.
    pub fn new(entries: Vec<AdditiveInfo>, combinations: Vec<CombinationRule>) -> Self {
        let mut kept = Vec::with_capacity(entries.len());
        let mut exact = HashMap::new();
        let mut ranges = Vec::new();

        for entry in entries {
            match AdditiveKey::parse(&entry.code) {
                Some(AdditiveKey::Exact { code }) => {
                    if exact.contains_key(&code) {
                        tracing::warn!("Duplicate additive key '{}' ignored", code);
                        continue;
                    }
                    exact.insert(code, kept.len());
                    kept.push(entry);
                }
                Some(AdditiveKey::Range { start, end }) => {
                    ranges.push((start, end, kept.len()));
                    kept.push(entry);
                }
                None => {
                    tracing::warn!("Unparseable additive key '{}' ignored", entry.code);
                }
            }
        }

        let combinations = combinations
            .into_iter()
            .map(|mut rule| {
                rule.codes = rule.codes.iter().map(|c| normalize_code(c)).collect();
                rule
            })
            .collect();

        Self {
            entries: kept,
            exact,
            ranges,
            combinations,
        }
    }

    /// The built-in additive table
    pub fn builtin() -> Self {
        let entries = BUILTIN_ADDITIVES.iter().map(AdditiveSeed::to_info).collect();
        let combinations = BUILTIN_COMBINATIONS
            .iter()
            .map(|(id, codes, message, penalty)| CombinationRule {
                id: id.to_string(),
                codes: codes.iter().map(|c| c.to_string()).collect(),
                message: message.to_string(),
                penalty: *penalty,
            })
            .collect();
        Self::new(entries, combinations)
    }

    /// Resolve a code as printed on a product. The returned record carries
    /// the normalized query code, so a range hit on `E202` reports `E202`.
    pub fn resolve(&self, code: &str) -> Option<AdditiveInfo> {
        let normalized = normalize_code(code);
        if normalized.is_empty() {
            return None;
        }

        if let Some(&idx) = self.exact.get(&normalized) {
            return Some(self.entries[idx].clone());
        }

        let number = numeric_part(&normalized)?;
        let idx = self
            .ranges
            .iter()
            .find(|(start, end, _)| (*start..=*end).contains(&number))
            .map(|(_, _, idx)| *idx)
            // Sub-variant such as `E322I` falls back to its base code
            .or_else(|| self.exact.get(&format!("E{}", number)).copied())?;

        let mut info = self.entries[idx].clone();
        info.code = normalized;
        Some(info)
    }

    pub fn entries(&self) -> &[AdditiveInfo] {
        &self.entries
    }

    pub fn combinations(&self) -> &[CombinationRule] {
        &self.combinations
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for AdditiveKnowledgeBase {
    fn default() -> Self {
        Self::builtin()
    }
}

// ============================================================================
// Built-in Data
// ============================================================================

struct AdditiveSeed {
    key: &'static str,
    name: &'static str,
    category: &'static str,
    concern: ConcernLevel,
    description: &'static str,
    health_effects: &'static [&'static str],
    why_avoid: &'static [&'static str],
    benefits: Option<&'static [&'static str]>,
    alternatives: Option<&'static str>,
}

impl AdditiveSeed {
    fn to_info(&self) -> AdditiveInfo {
        AdditiveInfo {
            code: self.key.to_string(),
            name: self.name.to_string(),
            category: self.category.to_string(),
            concern_level: self.concern,
            description: self.description.to_string(),
            health_effects: self.health_effects.iter().map(|s| s.to_string()).collect(),
            why_avoid: self.why_avoid.iter().map(|s| s.to_string()).collect(),
            benefits: self
                .benefits
                .map(|b| b.iter().map(|s| s.to_string()).collect()),
            alternatives: self.alternatives.map(str::to_string),
        }
    }
}

use crate::models::ConcernLevel::{High, Low, Moderate, VeryHigh};

const BUILTIN_COMBINATIONS: &[(&str, &[&str], &str, i32)] = &[
    (
        "flavour_enhancer_stack",
        &["E621", "E627", "E631", "E635"],
        "Several flavour enhancers together amplify savoury taste and usually signal a heavily processed, salty product",
        -3,
    ),
    (
        "benzoate_ascorbate",
        &["E211", "E300"],
        "Sodium benzoate combined with ascorbic acid can form benzene, especially in drinks exposed to heat or light",
        -5,
    ),
    (
        "southampton_colours",
        &["E102", "E104", "E110", "E122", "E124", "E129", "E211"],
        "Mixtures of these colours with sodium benzoate were linked to hyperactivity in children",
        -5,
    ),
    (
        "sweetener_blend",
        &["E950", "E951", "E952", "E954", "E955"],
        "Multiple intense sweeteners are used together to mask aftertaste, increasing total sweetener exposure",
        -2,
    ),
    (
        "phosphate_load",
        &["E338", "E450", "E451", "E452"],
        "Several phosphate additives add up to a high intake of readily absorbed phosphorus",
        -2,
    ),
];

const BUILTIN_ADDITIVES: &[AdditiveSeed] = &[
    // --- Colours ---
    AdditiveSeed {
        key: "E102",
        name: "Tartrazine",
        category: "Colour",
        concern: High,
        description: "Synthetic lemon-yellow azo dye",
        health_effects: &["May cause hyperactivity in children", "Can trigger allergic reactions, especially in aspirin-sensitive people"],
        why_avoid: &["Products in the EU must carry a warning about effects on children's attention"],
        benefits: None,
        alternatives: Some("Curcumin (E100) or beta-carotene (E160a)"),
    },
    AdditiveSeed {
        key: "E104",
        name: "Quinoline Yellow",
        category: "Colour",
        concern: High,
        description: "Synthetic greenish-yellow dye",
        health_effects: &["May cause hyperactivity in children"],
        why_avoid: &["Banned as a food colour in several countries"],
        benefits: None,
        alternatives: Some("Curcumin (E100)"),
    },
    AdditiveSeed {
        key: "E110",
        name: "Sunset Yellow FCF",
        category: "Colour",
        concern: High,
        description: "Synthetic orange-yellow azo dye",
        health_effects: &["May cause hyperactivity in children", "Possible allergic reactions"],
        why_avoid: &["Requires a warning label in the EU"],
        benefits: None,
        alternatives: Some("Paprika extract (E160c)"),
    },
    AdditiveSeed {
        key: "E122",
        name: "Azorubine",
        category: "Colour",
        concern: High,
        description: "Synthetic red azo dye",
        health_effects: &["May cause hyperactivity in children", "Possible allergic reactions"],
        why_avoid: &["Requires a warning label in the EU"],
        benefits: None,
        alternatives: Some("Beetroot red (E162)"),
    },
    AdditiveSeed {
        key: "E124",
        name: "Ponceau 4R",
        category: "Colour",
        concern: High,
        description: "Synthetic strawberry-red azo dye",
        health_effects: &["May cause hyperactivity in children"],
        why_avoid: &["Not permitted in the United States"],
        benefits: None,
        alternatives: Some("Anthocyanins (E163)"),
    },
    AdditiveSeed {
        key: "E129",
        name: "Allura Red AC",
        category: "Colour",
        concern: High,
        description: "Synthetic red azo dye",
        health_effects: &["May cause hyperactivity in children"],
        why_avoid: &["Requires a warning label in the EU"],
        benefits: None,
        alternatives: Some("Beetroot red (E162)"),
    },
    AdditiveSeed {
        key: "E133",
        name: "Brilliant Blue FCF",
        category: "Colour",
        concern: Moderate,
        description: "Synthetic blue triarylmethane dye",
        health_effects: &["Rare allergic reactions"],
        why_avoid: &[],
        benefits: None,
        alternatives: Some("Spirulina extract"),
    },
    AdditiveSeed {
        key: "E150D",
        name: "Sulphite ammonia caramel",
        category: "Colour",
        concern: Moderate,
        description: "Brown colour made by heating sugar with ammonia and sulphite compounds",
        health_effects: &["Can contain 4-methylimidazole, a by-product under scrutiny"],
        why_avoid: &["Mostly found in colas and dark processed sauces"],
        benefits: None,
        alternatives: Some("Plain caramel (E150a)"),
    },
    AdditiveSeed {
        key: "E160A",
        name: "Carotenes",
        category: "Colour",
        concern: Low,
        description: "Orange pigments from carrots, algae or synthesis",
        health_effects: &["Generally well tolerated"],
        why_avoid: &[],
        benefits: Some(&["Provitamin A activity"]),
        alternatives: None,
    },
    AdditiveSeed {
        key: "E171",
        name: "Titanium dioxide",
        category: "Colour",
        concern: VeryHigh,
        description: "White pigment made of titanium dioxide particles",
        health_effects: &["Genotoxicity concerns from nanoparticles cannot be ruled out"],
        why_avoid: &["No longer considered safe as a food additive in the EU since 2022"],
        benefits: None,
        alternatives: Some("Calcium carbonate (E170) or rice starch"),
    },
    // --- Preservatives ---
    AdditiveSeed {
        key: "E200-E203",
        name: "Sorbic acid and sorbates",
        category: "Preservative",
        concern: Low,
        description: "Mould and yeast inhibitors",
        health_effects: &["Occasional skin irritation in sensitive people"],
        why_avoid: &[],
        benefits: Some(&["Prevents mould growth"]),
        alternatives: None,
    },
    AdditiveSeed {
        key: "E210-E213",
        name: "Benzoic acid and benzoates",
        category: "Preservative",
        concern: Moderate,
        description: "Antimicrobial preservatives used in acidic foods",
        health_effects: &["May worsen asthma and urticaria in sensitive people"],
        why_avoid: &["Can form benzene together with vitamin C"],
        benefits: None,
        alternatives: Some("Refrigeration or pasteurisation"),
    },
    AdditiveSeed {
        key: "E211",
        name: "Sodium benzoate",
        category: "Preservative",
        concern: Moderate,
        description: "Sodium salt of benzoic acid, common in soft drinks",
        health_effects: &["May worsen asthma in sensitive people", "Linked with hyperactivity when combined with certain colours"],
        why_avoid: &["Can form benzene together with ascorbic acid (E300)"],
        benefits: None,
        alternatives: Some("Potassium sorbate (E202)"),
    },
    AdditiveSeed {
        key: "E220-E228",
        name: "Sulphur dioxide and sulphites",
        category: "Preservative",
        concern: Moderate,
        description: "Preservatives and antioxidants in wine, dried fruit and potato products",
        health_effects: &["Can trigger asthma attacks", "Destroys vitamin B1 in food"],
        why_avoid: &["Must be declared as an allergen above 10 mg/kg"],
        benefits: None,
        alternatives: Some("Unsulphured dried fruit"),
    },
    AdditiveSeed {
        key: "E249-E252",
        name: "Nitrites and nitrates",
        category: "Preservative",
        concern: High,
        description: "Curing salts used in processed meats",
        health_effects: &["Form nitrosamines, which are probable carcinogens", "Associated with colorectal cancer risk in processed meat"],
        why_avoid: &["Processed meat is classified as carcinogenic to humans"],
        benefits: Some(&["Protect against botulism"]),
        alternatives: Some("Fresh, uncured meat"),
    },
    AdditiveSeed {
        key: "E250",
        name: "Sodium nitrite",
        category: "Preservative",
        concern: High,
        description: "Curing agent that keeps processed meat pink",
        health_effects: &["Forms nitrosamines when heated with proteins"],
        why_avoid: &["Strongly associated with processed meat cancer risk"],
        benefits: Some(&["Prevents Clostridium botulinum growth"]),
        alternatives: Some("Fresh meat or nitrite-free cured products"),
    },
    AdditiveSeed {
        key: "E280-E283",
        name: "Propionic acid and propionates",
        category: "Preservative",
        concern: Low,
        description: "Mould inhibitors used mainly in bread",
        health_effects: &["Generally well tolerated"],
        why_avoid: &[],
        benefits: Some(&["Extends bread shelf life"]),
        alternatives: None,
    },
    // --- Antioxidants and acids ---
    AdditiveSeed {
        key: "E300",
        name: "Ascorbic acid",
        category: "Antioxidant",
        concern: Low,
        description: "Vitamin C",
        health_effects: &["Safe at food levels"],
        why_avoid: &[],
        benefits: Some(&["Vitamin C activity", "Prevents browning"]),
        alternatives: None,
    },
    AdditiveSeed {
        key: "E301",
        name: "Sodium ascorbate",
        category: "Antioxidant",
        concern: Low,
        description: "Sodium salt of vitamin C",
        health_effects: &["Safe at food levels"],
        why_avoid: &[],
        benefits: Some(&["Reduces nitrosamine formation in cured meat"]),
        alternatives: None,
    },
    AdditiveSeed {
        key: "E306-E309",
        name: "Tocopherols",
        category: "Antioxidant",
        concern: Low,
        description: "Vitamin E compounds that protect fats from oxidation",
        health_effects: &["Safe at food levels"],
        why_avoid: &[],
        benefits: Some(&["Vitamin E activity"]),
        alternatives: None,
    },
    AdditiveSeed {
        key: "E320",
        name: "Butylated hydroxyanisole (BHA)",
        category: "Antioxidant",
        concern: VeryHigh,
        description: "Synthetic antioxidant for fats and oils",
        health_effects: &["Possible human carcinogen", "Suspected endocrine disruptor"],
        why_avoid: &["Classified as possibly carcinogenic to humans"],
        benefits: None,
        alternatives: Some("Tocopherols (E306-E309) or rosemary extract"),
    },
    AdditiveSeed {
        key: "E321",
        name: "Butylated hydroxytoluene (BHT)",
        category: "Antioxidant",
        concern: High,
        description: "Synthetic antioxidant for fats and oils",
        health_effects: &["Suspected endocrine disruptor", "Liver and thyroid effects in animal studies"],
        why_avoid: &["Restricted in several countries"],
        benefits: None,
        alternatives: Some("Tocopherols (E306-E309)"),
    },
    AdditiveSeed {
        key: "E322",
        name: "Lecithins",
        category: "Emulsifier",
        concern: Low,
        description: "Phospholipids, usually from soy or sunflower",
        health_effects: &["Generally well tolerated"],
        why_avoid: &[],
        benefits: Some(&["Source of choline"]),
        alternatives: None,
    },
    AdditiveSeed {
        key: "E330",
        name: "Citric acid",
        category: "Acidity regulator",
        concern: Low,
        description: "Naturally occurring fruit acid",
        health_effects: &["Can erode tooth enamel in acidic drinks"],
        why_avoid: &[],
        benefits: Some(&["Natural preservative and flavour"]),
        alternatives: None,
    },
    AdditiveSeed {
        key: "E338",
        name: "Phosphoric acid",
        category: "Acidity regulator",
        concern: Moderate,
        description: "Strong acid used mainly in colas",
        health_effects: &["Associated with lower bone mineral density", "Erodes tooth enamel"],
        why_avoid: &["Adds to total phosphate intake"],
        benefits: None,
        alternatives: Some("Citric acid (E330)"),
    },
    AdditiveSeed {
        key: "E339-E341",
        name: "Sodium, potassium and calcium phosphates",
        category: "Acidity regulator",
        concern: Low,
        description: "Mineral salts used as buffers and raising agents",
        health_effects: &["Contribute to phosphorus intake"],
        why_avoid: &[],
        benefits: None,
        alternatives: None,
    },
    // --- Thickeners, stabilisers, emulsifiers ---
    AdditiveSeed {
        key: "E407",
        name: "Carrageenan",
        category: "Thickener",
        concern: Moderate,
        description: "Seaweed-derived gelling agent",
        health_effects: &["Linked to gut inflammation in animal studies"],
        why_avoid: &["Degraded carrageenan is a possible carcinogen"],
        benefits: None,
        alternatives: Some("Agar (E406)"),
    },
    AdditiveSeed {
        key: "E412",
        name: "Guar gum",
        category: "Thickener",
        concern: Low,
        description: "Soluble fibre from guar beans",
        health_effects: &["Bloating at high doses"],
        why_avoid: &[],
        benefits: Some(&["Soluble fibre"]),
        alternatives: None,
    },
    AdditiveSeed {
        key: "E415",
        name: "Xanthan gum",
        category: "Thickener",
        concern: Low,
        description: "Fermentation-derived polysaccharide",
        health_effects: &["Generally well tolerated"],
        why_avoid: &[],
        benefits: None,
        alternatives: None,
    },
    AdditiveSeed {
        key: "E433",
        name: "Polysorbate 80",
        category: "Emulsifier",
        concern: Moderate,
        description: "Synthetic emulsifier",
        health_effects: &["Disrupted gut microbiota in animal studies"],
        why_avoid: &["Associated with low-grade intestinal inflammation"],
        benefits: None,
        alternatives: Some("Lecithins (E322)"),
    },
    AdditiveSeed {
        key: "E450-E452",
        name: "Diphosphates, triphosphates and polyphosphates",
        category: "Stabiliser",
        concern: Moderate,
        description: "Phosphate salts used in processed meat, cheese and baking powder",
        health_effects: &["High phosphate intake is linked to cardiovascular and kidney strain"],
        why_avoid: &["Common marker of heavily processed meat products"],
        benefits: None,
        alternatives: None,
    },
    AdditiveSeed {
        key: "E466",
        name: "Carboxymethyl cellulose",
        category: "Thickener",
        concern: Moderate,
        description: "Modified cellulose thickener",
        health_effects: &["Altered gut microbiota in human and animal studies"],
        why_avoid: &["Associated with intestinal inflammation"],
        benefits: None,
        alternatives: Some("Guar gum (E412)"),
    },
    AdditiveSeed {
        key: "E471",
        name: "Mono- and diglycerides of fatty acids",
        category: "Emulsifier",
        concern: Moderate,
        description: "Fat-derived emulsifiers",
        health_effects: &["May contain trans fats", "Associated with cardiovascular risk in cohort studies"],
        why_avoid: &["Frequent in ultra-processed baked goods"],
        benefits: None,
        alternatives: Some("Lecithins (E322)"),
    },
    AdditiveSeed {
        key: "E476",
        name: "Polyglycerol polyricinoleate",
        category: "Emulsifier",
        concern: Low,
        description: "Emulsifier from castor oil used in chocolate",
        health_effects: &["Generally well tolerated"],
        why_avoid: &[],
        benefits: None,
        alternatives: None,
    },
    AdditiveSeed {
        key: "E500",
        name: "Sodium carbonates",
        category: "Raising agent",
        concern: Low,
        description: "Baking soda and related salts",
        health_effects: &["Adds sodium"],
        why_avoid: &[],
        benefits: None,
        alternatives: None,
    },
    AdditiveSeed {
        key: "E551",
        name: "Silicon dioxide",
        category: "Anti-caking agent",
        concern: Low,
        description: "Silica used to keep powders free-flowing",
        health_effects: &["Poorly absorbed"],
        why_avoid: &[],
        benefits: None,
        alternatives: None,
    },
    // --- Flavour enhancers ---
    AdditiveSeed {
        key: "E620-E625",
        name: "Glutamic acid and glutamates",
        category: "Flavour enhancer",
        concern: Moderate,
        description: "Umami flavour enhancers",
        health_effects: &["Headaches and flushing reported by sensitive people"],
        why_avoid: &["Encourages overeating of salty, savoury foods"],
        benefits: None,
        alternatives: Some("Herbs, spices, yeast extract"),
    },
    AdditiveSeed {
        key: "E621",
        name: "Monosodium glutamate",
        category: "Flavour enhancer",
        concern: Moderate,
        description: "Sodium salt of glutamic acid",
        health_effects: &["Headaches and flushing reported by sensitive people", "Adds sodium"],
        why_avoid: &["Makes highly processed foods more palatable"],
        benefits: None,
        alternatives: Some("Herbs, spices, mushrooms or tomato"),
    },
    AdditiveSeed {
        key: "E627",
        name: "Disodium guanylate",
        category: "Flavour enhancer",
        concern: Moderate,
        description: "Nucleotide flavour enhancer, usually paired with MSG",
        health_effects: &["Should be avoided by people with gout"],
        why_avoid: &["Nearly always used alongside MSG"],
        benefits: None,
        alternatives: None,
    },
    AdditiveSeed {
        key: "E631",
        name: "Disodium inosinate",
        category: "Flavour enhancer",
        concern: Moderate,
        description: "Nucleotide flavour enhancer, often of animal origin",
        health_effects: &["Should be avoided by people with gout"],
        why_avoid: &["Nearly always used alongside MSG"],
        benefits: None,
        alternatives: None,
    },
    AdditiveSeed {
        key: "E635",
        name: "Disodium 5'-ribonucleotides",
        category: "Flavour enhancer",
        concern: Moderate,
        description: "Mixture of E627 and E631",
        health_effects: &["Skin rashes reported in sensitive people"],
        why_avoid: &["Should be avoided by people with gout"],
        benefits: None,
        alternatives: None,
    },
    // --- Sweeteners ---
    AdditiveSeed {
        key: "E950",
        name: "Acesulfame K",
        category: "Sweetener",
        concern: High,
        description: "Intense synthetic sweetener",
        health_effects: &["Possible effects on gut microbiota", "Long-term safety questioned"],
        why_avoid: &["Maintains a preference for intensely sweet tastes"],
        benefits: Some(&["No calories"]),
        alternatives: Some("Reduced sweetness or steviol glycosides (E960)"),
    },
    AdditiveSeed {
        key: "E951",
        name: "Aspartame",
        category: "Sweetener",
        concern: VeryHigh,
        description: "Intense synthetic sweetener",
        health_effects: &["Classified as possibly carcinogenic to humans", "Dangerous for people with phenylketonuria"],
        why_avoid: &["Contains a source of phenylalanine", "Cancer risk under investigation"],
        benefits: Some(&["No calories"]),
        alternatives: Some("Water, unsweetened drinks, or steviol glycosides (E960)"),
    },
    AdditiveSeed {
        key: "E952",
        name: "Cyclamates",
        category: "Sweetener",
        concern: High,
        description: "Intense synthetic sweeteners",
        health_effects: &["Banned in the United States since 1969"],
        why_avoid: &["Acceptable daily intake easily exceeded by heavy soft-drink consumers"],
        benefits: None,
        alternatives: Some("Steviol glycosides (E960)"),
    },
    AdditiveSeed {
        key: "E954",
        name: "Saccharin",
        category: "Sweetener",
        concern: High,
        description: "Oldest synthetic sweetener",
        health_effects: &["May alter gut microbiota and glucose tolerance"],
        why_avoid: &["Bitter aftertaste usually masked with other sweeteners"],
        benefits: None,
        alternatives: Some("Steviol glycosides (E960)"),
    },
    AdditiveSeed {
        key: "E955",
        name: "Sucralose",
        category: "Sweetener",
        concern: High,
        description: "Chlorinated sugar derivative",
        health_effects: &["May alter gut microbiota", "Can form chlorinated compounds when heated"],
        why_avoid: &["Not suitable for baking at high temperatures"],
        benefits: Some(&["No calories"]),
        alternatives: Some("Reduced sweetness"),
    },
    AdditiveSeed {
        key: "E960",
        name: "Steviol glycosides",
        category: "Sweetener",
        concern: Low,
        description: "Sweeteners extracted from the stevia plant",
        health_effects: &["Generally well tolerated"],
        why_avoid: &[],
        benefits: Some(&["No calories", "Plant origin"]),
        alternatives: None,
    },
    AdditiveSeed {
        key: "E965",
        name: "Maltitol",
        category: "Sweetener",
        concern: Moderate,
        description: "Sugar alcohol",
        health_effects: &["Laxative effect in larger amounts", "Raises blood sugar more than other polyols"],
        why_avoid: &["Excessive consumption may have laxative effects"],
        benefits: None,
        alternatives: Some("Erythritol (E968)"),
    },
    AdditiveSeed {
        key: "E1442",
        name: "Hydroxypropyl distarch phosphate",
        category: "Thickener",
        concern: Low,
        description: "Chemically modified starch",
        health_effects: &["Generally well tolerated"],
        why_avoid: &[],
        benefits: None,
        alternatives: Some("Native starch"),
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_keys() {
        assert_eq!(
            AdditiveKey::parse("e621"),
            Some(AdditiveKey::Exact { code: "E621".to_string() })
        );
        assert_eq!(
            AdditiveKey::parse("E200-E203"),
            Some(AdditiveKey::Range { start: 200, end: 203 })
        );
        assert_eq!(AdditiveKey::parse("E203-E200"), None);
        assert_eq!(AdditiveKey::parse("EXX-E203"), None);
        assert_eq!(AdditiveKey::parse("  "), None);
    }

    #[test]
    fn test_numeric_part() {
        assert_eq!(numeric_part("E150D"), Some(150));
        assert_eq!(numeric_part("e1442"), Some(1442));
        assert_eq!(numeric_part("E160a(ii)"), Some(160));
        assert_eq!(numeric_part("E"), None);
        assert_eq!(numeric_part("INS"), None);
    }

    #[test]
    fn test_resolve_exact_is_case_insensitive_and_trimmed() {
        let kb = AdditiveKnowledgeBase::builtin();
        let info = kb.resolve("  e621 ").unwrap();
        assert_eq!(info.code, "E621");
        assert_eq!(info.name, "Monosodium glutamate");
        assert_eq!(info.concern_level, ConcernLevel::Moderate);

        let caramel = kb.resolve("E150d").unwrap();
        assert_eq!(caramel.concern_level, ConcernLevel::Moderate);
    }

    #[test]
    fn test_resolve_range_match() {
        let kb = AdditiveKnowledgeBase::builtin();
        let info = kb.resolve("E202").unwrap();
        assert_eq!(info.code, "E202");
        assert_eq!(info.name, "Sorbic acid and sorbates");

        // Range bounds are inclusive
        assert!(kb.resolve("E200").is_some());
        assert!(kb.resolve("E203").is_some());
        assert!(kb.resolve("E204").is_none());
    }

    #[test]
    fn test_exact_entry_wins_over_range() {
        let kb = AdditiveKnowledgeBase::builtin();
        assert_eq!(kb.resolve("E211").unwrap().name, "Sodium benzoate");
        assert_eq!(kb.resolve("E212").unwrap().name, "Benzoic acid and benzoates");
        assert_eq!(kb.resolve("E250").unwrap().name, "Sodium nitrite");
    }

    #[test]
    fn test_sub_variant_resolves_to_base_entry() {
        let kb = AdditiveKnowledgeBase::builtin();
        let info = kb.resolve("e322i").unwrap();
        assert_eq!(info.code, "E322I");
        assert_eq!(info.name, kb.resolve("E322").unwrap().name);

        // A specific entry still wins over its base code
        assert_eq!(kb.resolve("E150D").unwrap().code, "E150D");
        assert!(kb.resolve("E150A").is_none());
    }

    #[test]
    fn test_unknown_codes() {
        let kb = AdditiveKnowledgeBase::builtin();
        assert!(kb.resolve("E999").is_none());
        assert!(kb.resolve("").is_none());
        assert!(kb.resolve("salt").is_none());
    }

    #[test]
    fn test_builtin_has_core_entries() {
        let kb = AdditiveKnowledgeBase::builtin();
        assert_eq!(kb.resolve("E951").unwrap().concern_level, ConcernLevel::VeryHigh);
        assert!(kb.len() > 40);
        assert!(!kb.combinations().is_empty());
        assert!(kb
            .combinations()
            .iter()
            .all(|rule| rule.codes.len() >= 2 && rule.penalty < 0));
    }

    #[test]
    fn test_substitute_table() {
        let entry = AdditiveInfo {
            code: "E100-E199".to_string(),
            name: "Any colour".to_string(),
            category: "Colour".to_string(),
            concern_level: ConcernLevel::High,
            description: "Test colour".to_string(),
            health_effects: vec![],
            why_avoid: vec![],
            benefits: None,
            alternatives: None,
        };
        let kb = AdditiveKnowledgeBase::new(vec![entry.clone(), entry], vec![]);
        assert_eq!(kb.len(), 2);
        assert_eq!(kb.resolve("E150").unwrap().concern_level, ConcernLevel::High);
        assert!(kb.resolve("E621").is_none());
    }

    #[test]
    fn test_duplicate_exact_keys_keep_first() {
        let make = |name: &str| AdditiveInfo {
            code: "E1".to_string(),
            name: name.to_string(),
            category: "Test".to_string(),
            concern_level: ConcernLevel::Low,
            description: String::new(),
            health_effects: vec![],
            why_avoid: vec![],
            benefits: None,
            alternatives: None,
        };
        let kb = AdditiveKnowledgeBase::new(vec![make("first"), make("second")], vec![]);
        assert_eq!(kb.len(), 1);
        assert_eq!(kb.resolve("e1").unwrap().name, "first");
    }
}
