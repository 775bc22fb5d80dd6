//! Built-in trait catalog compiled into the binary.

use std::sync::LazyLock;

use super::{Difficulty, Metrics, Trait, TraitCatalog};

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(ToString::to_string).collect()
}

static BUILTIN_TRAITS: LazyLock<TraitCatalog> = LazyLock::new(|| {
    TraitCatalog::new([
        (
            "bacterial-resistance".to_string(),
            Trait {
                name: "Bacterial Disease Resistance (Rice)".to_string(),
                organism: "Oryza sativa (Rice)".to_string(),
                description: "Add Xa21 gene for bacterial blight resistance".to_string(),
                target_gene: "Xa21 receptor gene".to_string(),
                mechanism: "Pattern recognition receptor insertion".to_string(),
                difficulty: Difficulty::Medium,
                metrics: Metrics {
                    success_rate: 87,
                    off_target_risk: 12,
                    mutation_rate: 8,
                },
                phenotype: "Enhanced pathogen detection and immune response".to_string(),
                benefits: strings(&["Reduced crop loss", "Less pesticide use", "Food security"]),
                risks: strings(&[
                    "Potential allergen creation",
                    "Resistance evolution",
                    "Ecosystem disruption",
                ]),
                dna_original: "ATCGATCGAAGCTTACGTTAGCGGATCCAATGC".to_string(),
                dna_edited: "ATCGATCG[Xa21-INSERTION]TACGTTAGCGGATCCAATGC".to_string(),
                function_change: "Pathogen detection → Immune response activation".to_string(),
            },
        ),
        (
            "protein-production".to_string(),
            Trait {
                name: "Enhanced Insulin Production (E. coli)".to_string(),
                organism: "Escherichia coli".to_string(),
                description: "Optimize insulin gene expression with stronger promoter".to_string(),
                target_gene: "Human insulin gene + T7 promoter".to_string(),
                mechanism: "Promoter replacement and codon optimization".to_string(),
                difficulty: Difficulty::Easy,
                metrics: Metrics {
                    success_rate: 94,
                    off_target_risk: 6,
                    mutation_rate: 4,
                },
                phenotype: "300% increased insulin protein yield".to_string(),
                benefits: strings(&[
                    "Medical insulin supply",
                    "Cost reduction",
                    "Scalable production",
                ]),
                risks: strings(&[
                    "Protein misfolding",
                    "Bacterial contamination",
                    "Uncontrolled expression",
                ]),
                dna_original: "TTGACAATTAATCATCGGCTCGTATAATGTGTG".to_string(),
                dna_edited: "TTGACA[T7-PROMOTER]ATCATCGGCTCGTATAATGTGTG".to_string(),
                function_change: "Low expression → High-yield insulin production".to_string(),
            },
        ),
        (
            "drought-tolerance".to_string(),
            Trait {
                name: "Drought Tolerance (Wheat)".to_string(),
                organism: "Triticum aestivum (Wheat)".to_string(),
                description: "Insert DREB1A transcription factor for water stress tolerance"
                    .to_string(),
                target_gene: "DREB1A transcription factor".to_string(),
                mechanism: "Stress response pathway enhancement".to_string(),
                difficulty: Difficulty::Hard,
                metrics: Metrics {
                    success_rate: 76,
                    off_target_risk: 22,
                    mutation_rate: 18,
                },
                phenotype: "Enhanced water retention and stress signaling".to_string(),
                benefits: strings(&[
                    "Climate resilience",
                    "Reduced irrigation needs",
                    "Stable yields",
                ]),
                risks: strings(&[
                    "Growth rate changes",
                    "Nutritional alterations",
                    "Gene flow to wild relatives",
                ]),
                dna_original: "GCTAGCTAGCAATGCCGGAATTCGAGCTCGGTAC".to_string(),
                dna_edited: "GCTAGCTAG[DREB1A-CASSETTE]GAATTCGAGCTCGGTAC".to_string(),
                function_change: "Normal water response → Enhanced drought survival".to_string(),
            },
        ),
        (
            "nitrogen-fixation".to_string(),
            Trait {
                name: "Nitrogen Fixation (Rice)".to_string(),
                organism: "Oryza sativa + Rhizobium".to_string(),
                description: "Engineer symbiotic nitrogen fixation pathway".to_string(),
                target_gene: "nifH, nifD, nifK gene cluster".to_string(),
                mechanism: "Multi-gene pathway insertion".to_string(),
                difficulty: Difficulty::Expert,
                metrics: Metrics {
                    success_rate: 58,
                    off_target_risk: 35,
                    mutation_rate: 28,
                },
                phenotype: "Bacterial symbiosis for atmospheric nitrogen conversion".to_string(),
                benefits: strings(&[
                    "Reduced fertilizer use",
                    "Environmental protection",
                    "Self-sustaining crops",
                ]),
                risks: strings(&[
                    "Complex pathway disruption",
                    "Metabolic burden",
                    "Horizontal gene transfer",
                ]),
                dna_original: "AATTCCGGAATTCGATATCAAGCTTATCGATACCG".to_string(),
                dna_edited: "AATTCCGG[NIF-GENE-CLUSTER]TATCAAGCTTATCGATACCG".to_string(),
                function_change: "Fertilizer dependent → Self-sustaining nitrogen supply"
                    .to_string(),
            },
        ),
    ])
});

/// Returns a copy of the built-in catalog.
#[must_use]
pub fn builtin_catalog() -> TraitCatalog {
    BUILTIN_TRAITS.clone()
}
