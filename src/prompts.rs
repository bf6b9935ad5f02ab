//! Sub-metric prompt catalog
//!
//! Defines the sub-metrics scored under each main metric, together with the
//! prompt template a model-backed scorer renders for each one. The stub scorer
//! uses the same rendered prompt as its deterministic input, so both variants
//! share one catalog.
//!
//! Impact: strategic_fit, business_value, scalability.
//! Effort: projected_timeline, person_day_effort, external_dependency.
//! Risk: scope_definition_risk, talent_dependency, complexity_risk,
//! implementation_failure_risk.

use crate::error::{Result, ThemisError};
use crate::types::{Exemplar, Metric};
use once_cell::sync::Lazy;

/// Sub-metric prompt definition
///
/// The template must include the "{project_text}" placeholder; "{exemplars}"
/// is filled with retrieved reference snippets (or "(none)").
/// A model scorer must return JSON only: {"score_1_to_5": float, "reason": str}
#[derive(Debug, Clone)]
pub struct SubMetricPrompt {
    /// Stable catalog key used in requests and responses
    pub key: &'static str,

    /// Display name
    pub name: &'static str,

    /// What this sub-metric measures
    pub description: &'static str,

    /// Main metric this sub-metric aggregates into
    pub metric: Metric,

    /// Prompt template
    pub template: &'static str,
}

impl SubMetricPrompt {
    /// Render the prompt with the project text and exemplar block substituted
    pub fn render(&self, project_text: &str, exemplars: &[Exemplar]) -> String {
        let exemplar_block = if exemplars.is_empty() {
            "(none)".to_string()
        } else {
            exemplars
                .iter()
                .map(|e| format!("[{}] {}", e.source, e.snippet))
                .collect::<Vec<_>>()
                .join("\n")
        };

        self.template
            .replace("{project_text}", project_text)
            .replace("{exemplars}", &exemplar_block)
    }
}

/// Static catalog of every scored sub-metric, in response order
pub static CATALOG: Lazy<Vec<SubMetricPrompt>> = Lazy::new(|| {
    vec![
        // Impact
        SubMetricPrompt {
            key: "strategic_fit",
            name: "Strategic Fit",
            description: "Alignment to strategy and core objectives.",
            metric: Metric::Impact,
            template: "Project:\n{project_text}\n\n\
                Rate the Strategic Fit of the project above (1-5). Consider:\n\
                - Alignment with company strategy and core objectives\n\n\
                Reference examples from past projects:\n{exemplars}\n\n\
                Return JSON only: {\"score_1_to_5\": float, \"reason\": str}",
        },
        SubMetricPrompt {
            key: "business_value",
            name: "Business Value Contribution",
            description: "Expected measurable benefits and stakeholder impact.",
            metric: Metric::Impact,
            template: "Project:\n{project_text}\n\n\
                Rate the Business Value Contribution of the project above (1-5). Consider:\n\
                - Measurable benefits (revenue, cost, quality)\n\
                - Breadth of stakeholder impact\n\n\
                Reference examples from past projects:\n{exemplars}\n\n\
                Return JSON only: {\"score_1_to_5\": float, \"reason\": str}",
        },
        SubMetricPrompt {
            key: "scalability",
            name: "Scalability & Replicability Potential",
            description: "Potential to scale the solution or replicate it elsewhere.",
            metric: Metric::Impact,
            template: "Project:\n{project_text}\n\n\
                Rate the Scalability & Replicability Potential of the project above (1-5). Consider:\n\
                - Reuse across business units or datasets\n\
                - Growth headroom of the underlying solution\n\n\
                Reference examples from past projects:\n{exemplars}\n\n\
                Return JSON only: {\"score_1_to_5\": float, \"reason\": str}",
        },
        // Effort
        SubMetricPrompt {
            key: "projected_timeline",
            name: "Projected Timeline",
            description: "Expected calendar duration until delivery.",
            metric: Metric::Effort,
            template: "Project:\n{project_text}\n\n\
                Rate the Projected Timeline of the project above (1-5, longer is higher). Consider:\n\
                - Expected calendar duration until a usable deliverable\n\n\
                Reference examples from past projects:\n{exemplars}\n\n\
                Return JSON only: {\"score_1_to_5\": float, \"reason\": str}",
        },
        SubMetricPrompt {
            key: "person_day_effort",
            name: "Estimated Person-Day Effort",
            description: "Estimated internal work volume in person-days.",
            metric: Metric::Effort,
            template: "Project:\n{project_text}\n\n\
                Rate the Estimated Person-Day Effort of the project above (1-5, more is higher). Consider:\n\
                - Internal staffing volume across all involved roles\n\n\
                Reference examples from past projects:\n{exemplars}\n\n\
                Return JSON only: {\"score_1_to_5\": float, \"reason\": str}",
        },
        SubMetricPrompt {
            key: "external_dependency",
            name: "External Resource Dependency",
            description: "Reliance on vendors, consultants, or external data.",
            metric: Metric::Effort,
            template: "Project:\n{project_text}\n\n\
                Rate the External Resource Dependency of the project above (1-5, more is higher). Consider:\n\
                - Vendors, consultants, and external data or tooling the delivery relies on\n\n\
                Reference examples from past projects:\n{exemplars}\n\n\
                Return JSON only: {\"score_1_to_5\": float, \"reason\": str}",
        },
        // Risk
        SubMetricPrompt {
            key: "scope_definition_risk",
            name: "Scope Definition Risk",
            description: "Risk from unclear or shifting scope and objectives.",
            metric: Metric::Risk,
            template: "Project:\n{project_text}\n\n\
                Rate the Scope Definition Risk of the project above (1-5). Consider:\n\
                - Clarity and stability of scope and objectives\n\n\
                Reference examples from past projects:\n{exemplars}\n\n\
                Return JSON only: {\"score_1_to_5\": float, \"reason\": str}",
        },
        SubMetricPrompt {
            key: "talent_dependency",
            name: "Critical Talent Dependency",
            description: "Risk from dependence on scarce or single-point expertise.",
            metric: Metric::Risk,
            template: "Project:\n{project_text}\n\n\
                Rate the Critical Talent Dependency of the project above (1-5). Consider:\n\
                - Dependence on scarce skills or single-point expertise\n\n\
                Reference examples from past projects:\n{exemplars}\n\n\
                Return JSON only: {\"score_1_to_5\": float, \"reason\": str}",
        },
        SubMetricPrompt {
            key: "complexity_risk",
            name: "Solution Complexity & Innovation Risk",
            description: "Technical novelty and complexity of the solution.",
            metric: Metric::Risk,
            template: "Project:\n{project_text}\n\n\
                Rate the Solution Complexity & Innovation Risk of the project above (1-5). Consider:\n\
                - Technical novelty and integration complexity\n\n\
                Reference examples from past projects:\n{exemplars}\n\n\
                Return JSON only: {\"score_1_to_5\": float, \"reason\": str}",
        },
        SubMetricPrompt {
            key: "implementation_failure_risk",
            name: "Implementation Failure Risk",
            description: "Risk that delivery fails or stalls in implementation.",
            metric: Metric::Risk,
            template: "Project:\n{project_text}\n\n\
                Rate the Implementation Failure Risk of the project above (1-5). Consider:\n\
                - Likelihood of delivery stalling or failing to reach production\n\n\
                Reference examples from past projects:\n{exemplars}\n\n\
                Return JSON only: {\"score_1_to_5\": float, \"reason\": str}",
        },
    ]
});

/// Look up a sub-metric prompt by catalog key
pub fn lookup(key: &str) -> Result<&'static SubMetricPrompt> {
    CATALOG
        .iter()
        .find(|p| p.key == key)
        .ok_or_else(|| ThemisError::InvalidSubMetric(key.to_string()))
}

/// All sub-metric prompts under the given main metric, in catalog order
pub fn for_metric(metric: Metric) -> Vec<&'static SubMetricPrompt> {
    CATALOG.iter().filter(|p| p.metric == metric).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const JSON_CONTRACT: &str = r#"Return JSON only: {"score_1_to_5": float, "reason": str}"#;

    #[test]
    fn test_catalog_shape() {
        assert_eq!(CATALOG.len(), 10);
        assert_eq!(for_metric(Metric::Impact).len(), 3);
        assert_eq!(for_metric(Metric::Effort).len(), 3);
        assert_eq!(for_metric(Metric::Risk).len(), 4);
    }

    #[test]
    fn test_catalog_keys_unique() {
        let mut keys: Vec<_> = CATALOG.iter().map(|p| p.key).collect();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), CATALOG.len());
    }

    #[test]
    fn test_templates_carry_placeholders_and_contract() {
        for prompt in CATALOG.iter() {
            assert!(prompt.template.contains("{project_text}"), "{}", prompt.key);
            assert!(prompt.template.contains("{exemplars}"), "{}", prompt.key);
            assert!(prompt.template.contains(JSON_CONTRACT), "{}", prompt.key);
        }
    }

    #[test]
    fn test_lookup() {
        let prompt = lookup("strategic_fit").unwrap();
        assert_eq!(prompt.name, "Strategic Fit");
        assert_eq!(prompt.metric, Metric::Impact);

        let err = lookup("market_size").unwrap_err();
        assert!(matches!(
            err,
            crate::error::ThemisError::InvalidSubMetric(_)
        ));
    }

    #[test]
    fn test_render_substitutes_project_text_and_exemplars() {
        let prompt = lookup("business_value").unwrap();

        let rendered = prompt.render("Automate invoice matching", &[]);
        assert!(rendered.contains("Automate invoice matching"));
        assert!(rendered.contains("(none)"));

        let exemplars = vec![Exemplar {
            source: "alpha.md".to_string(),
            snippet: "Past rollout cut costs 12%".to_string(),
            similarity: Some(0.91),
        }];
        let rendered = prompt.render("Automate invoice matching", &exemplars);
        assert!(rendered.contains("[alpha.md] Past rollout cut costs 12%"));
        assert!(!rendered.contains("{exemplars}"));
    }
}
