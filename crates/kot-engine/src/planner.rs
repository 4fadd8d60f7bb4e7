use kot_core::value::repr;
use kot_core::{json_type_name, ProviderError, Value};

use crate::error::ResolveError;
use crate::registry::{Check, ParamSource};
use crate::resolver::{Bindings, Resolver};

/// One concrete execution unit of a check.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedInstance {
    /// Instance id, see [`instance_id`].
    pub id: String,
    /// Parameter values bound for this instance.
    pub bindings: Bindings,
}

/// Candidate values for one declared parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Axis {
    /// Parameter name.
    pub name: String,
    /// Values in source order.
    pub values: Vec<Value>,
}

/// `base` for unparametrized instances, otherwise
/// `base[name1=repr(v1),name2=repr(v2)]` in declaration order.
pub fn instance_id(base: &str, bindings: &Bindings) -> String {
    if bindings.is_empty() {
        return base.to_string();
    }
    let parts: Vec<String> = bindings
        .iter()
        .map(|(name, value)| format!("{name}={}", repr(value)))
        .collect();
    format!("{base}[{}]", parts.join(","))
}

/// Cartesian product of `axes`; the first axis varies slowest.
pub fn expand(base: &str, axes: &[Axis]) -> Vec<PlannedInstance> {
    let mut outputs = Vec::new();
    expand_axes(axes, 0, Bindings::new(), &mut outputs);
    outputs
        .into_iter()
        .map(|bindings| PlannedInstance {
            id: instance_id(base, &bindings),
            bindings,
        })
        .collect()
}

fn expand_axes(axes: &[Axis], idx: usize, current: Bindings, outputs: &mut Vec<Bindings>) {
    if idx == axes.len() {
        outputs.push(current);
        return;
    }
    let axis = &axes[idx];
    for value in &axis.values {
        let mut next = current.clone();
        next.insert(axis.name.clone(), value.clone());
        expand_axes(axes, idx + 1, next, outputs);
    }
}

/// Resolves every parametrize source of `check` and expands the plan.
/// A failing source fact or a source that is not an array fails the whole
/// check.
pub fn plan_check(check: &Check, resolver: &mut Resolver<'_>) -> Result<Vec<PlannedInstance>, ProviderError> {
    let mut axes = Vec::with_capacity(check.params().len());
    for param in check.params() {
        let values = match &param.source {
            ParamSource::Values(values) => values.clone(),
            ParamSource::Fact(fact) => {
                match resolver.resolve(fact).map_err(ResolveError::into_provider_error)? {
                    Value::Array(values) => values,
                    other => {
                        return Err(ProviderError::new(
                            "TypeError",
                            format!(
                                "parametrize source '{fact}' for '{}' must yield an array, got {}",
                                param.name,
                                json_type_name(&other)
                            ),
                        ))
                    }
                }
            }
        };
        axes.push(Axis {
            name: param.name.clone(),
            values,
        });
    }
    Ok(expand(check.name(), &axes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn axis(name: &str, values: Vec<Value>) -> Axis {
        Axis {
            name: name.to_string(),
            values,
        }
    }

    #[test]
    fn unparametrized_checks_plan_one_instance() {
        let plan = expand("c", &[]);
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].id, "c");
        assert!(plan[0].bindings.is_empty());
    }

    #[test]
    fn first_axis_varies_slowest() {
        let plan = expand(
            "c",
            &[
                axis("x", vec![json!(1), json!(2)]),
                axis("y", vec![json!("a"), json!("b")]),
            ],
        );
        let ids: Vec<_> = plan.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["c[x=1,y='a']", "c[x=1,y='b']", "c[x=2,y='a']", "c[x=2,y='b']"]);
    }

    #[test]
    fn empty_axis_plans_nothing() {
        let plan = expand("c", &[axis("x", vec![json!(1)]), axis("y", Vec::new())]);
        assert!(plan.is_empty());
    }
}
