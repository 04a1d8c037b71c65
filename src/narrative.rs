//! Deterministic natural-language summaries (Spanish)
//!
//! Template-based, not free-form: identical classified input always produces
//! identical text, byte for byte. The templates are the fixed phrases the
//! reports have always used, so they live here verbatim rather than being
//! assembled from smaller pieces.

use crate::classify::{merge_spans, AssociationCategory, EffectCategory, RangeSpan};
use crate::parser::transition::AreaChangeSet;
use crate::parser::weights::WeightTable;

// ==========================================================================
// Transition stage
// ==========================================================================

/// `"<area> tuvo N cambio(s) que fue(ron):"`
pub fn area_heading(area: &AreaChangeSet) -> String {
    let n = area.changes.len();
    let (plural, verb) = if n > 1 { ("s", "fueron") } else { ("", "fue") };
    format!("{} tuvo {} cambio{} que {}:", area.area_label, n, plural, verb)
}

/// `"- Pasó a <to> en un <pct>%"` with the rate at 4 decimals.
pub fn change_line(to_label: &str, rate: f64) -> String {
    format!("- Pasó a {} en un {:.4}%", to_label, rate * 100.0)
}

// ==========================================================================
// Weights stage
// ==========================================================================

fn effect_description(category: EffectCategory) -> &'static str {
    match category {
        EffectCategory::Favors => {
            "el cambio es claramente favorable, lo que indica una tendencia positiva"
        }
        EffectCategory::Neutral => {
            "el cambio se mantiene en una posición neutral, sugiriendo que los efectos \
             son mínimos o poco significativos"
        }
        EffectCategory::Opposes => {
            "se evidencia una clara repulsión al cambio, lo que refleja una resistencia \
             significativa"
        }
    }
}

fn range_clause(spans: &[&RangeSpan]) -> String {
    spans
        .iter()
        .enumerate()
        .map(|(i, span)| {
            if i == 0 {
                format!("en los rangos de {}", span.phrase())
            } else if i == spans.len() - 1 {
                format!("y {}", span.phrase())
            } else {
                span.phrase()
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// One paragraph per weight table. Spans are grouped per effect in the fixed
/// order favors → neutral → opposes; the first present effect opens the
/// sentence, interior ones get "Por otra parte," and the last "Finalmente,".
pub fn weights_summary(table: &WeightTable) -> String {
    let spans = merge_spans(&table.rows);
    let order = [
        EffectCategory::Favors,
        EffectCategory::Neutral,
        EffectCategory::Opposes,
    ];
    let present: Vec<(EffectCategory, Vec<&RangeSpan>)> = order
        .iter()
        .filter_map(|&category| {
            let members: Vec<&RangeSpan> =
                spans.iter().filter(|s| s.category == category).collect();
            (!members.is_empty()).then_some((category, members))
        })
        .collect();

    let mut text = format!(
        "En la {}, analizando {}, observamos que ",
        table.title, table.parameter
    );
    for (index, (category, members)) in present.iter().enumerate() {
        let ranges = range_clause(members);
        let effect = effect_description(*category);
        if index == 0 {
            text.push_str(&format!("{ranges}, {effect}. "));
        } else if index == present.len() - 1 {
            text.push_str(&format!("Finalmente, {ranges}, {effect}."));
        } else {
            text.push_str(&format!("Por otra parte, {ranges}, {effect}. "));
        }
    }
    text
}

// ==========================================================================
// Correlation stage
// ==========================================================================

/// Section title with the numeric band, as printed above each category list.
pub fn association_title(category: AssociationCategory) -> &'static str {
    match category {
        AssociationCategory::None => "Variables sin asociación (0 - 0.25):",
        AssociationCategory::Weak => "Variables con asociación mínima (0.25 - 0.5):",
        AssociationCategory::Moderate => "Variables con asociación moderada (0.5 - 0.75):",
        AssociationCategory::Strong => "Variables con asociación fuerte (0.75 - 1):",
        AssociationCategory::Complete => "Variables con asociación completa (1):",
    }
}

/// Fixed description paragraph per category. The first two bands share one
/// text: both are treated as independent for analysis purposes.
pub fn association_description(category: AssociationCategory) -> &'static str {
    const INDEPENDENT: &str = "Estas variables pueden considerarse independientes para el \
        análisis. No existe una relación significativa entre ellas, lo que sugiere que los \
        cambios en una variable no afectan a la otra. Este tipo de variables son ideales \
        para análisis independientes.";
    match category {
        AssociationCategory::None | AssociationCategory::Weak => INDEPENDENT,
        AssociationCategory::Moderate => {
            "Existe una relación notable entre estas variables que no debe ignorarse. Los \
             cambios en una variable tienen una influencia moderada en la otra, lo que \
             requiere un análisis conjunto para una comprensión completa del comportamiento \
             del sistema."
        }
        AssociationCategory::Strong => {
            "Existe una fuerte dependencia entre estas variables. Los cambios en una \
             variable están altamente relacionados con cambios en la otra. Esta fuerte \
             asociación debe ser un factor clave en cualquier análisis o toma de decisiones."
        }
        AssociationCategory::Complete => {
            "Estas variables están perfectamente correlacionadas, indicando una dependencia \
             total entre ellas. Cualquier cambio en una variable se refleja directamente en \
             la otra, sugiriendo que podrían ser redundantes en el análisis o representar \
             el mismo fenómeno desde diferentes perspectivas."
        }
    }
}

/// `"Grafo de <category title, lowercased, colon stripped>"`
pub fn graph_title(category: AssociationCategory) -> String {
    format!(
        "Grafo de {}",
        association_title(category).to_lowercase().replace(':', "")
    )
}
