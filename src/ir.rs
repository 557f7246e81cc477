use serde::{Deserialize, Serialize};

use crate::error::{ForestError, Result};

/// Metrics reported for one plan operator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OperatorInfo {
    pub name: String,
    #[serde(default)]
    pub cost: f64,
    #[serde(default)]
    pub est_rows: f64,
    #[serde(default)]
    pub act_rows: f64,
    #[serde(default)]
    pub access_table: String,
    #[serde(default)]
    pub access_index: String,
    #[serde(default)]
    pub access_partition: String,
    #[serde(default)]
    pub run_at: String,
    #[serde(default)]
    pub time_us: f64,
}

impl OperatorInfo {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Access object shown under the operator name, e.g. `table:t, index:idx(a)`.
    pub fn access_object(&self) -> Option<String> {
        let mut parts = Vec::new();
        if !self.access_table.is_empty() {
            parts.push(format!("table:{}", self.access_table));
        }
        if !self.access_index.is_empty() {
            parts.push(format!("index:{}", self.access_index));
        }
        if !self.access_partition.is_empty() {
            parts.push(format!("partition:{}", self.access_partition));
        }
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(", "))
        }
    }
}

/// One operator of an execution plan as delivered by the data source.
///
/// Trees must be acyclic and finite; nothing here validates that.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawNode {
    #[serde(flatten)]
    pub info: OperatorInfo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<RawNode>>,
}

impl RawNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            info: OperatorInfo::named(name),
            children: None,
        }
    }

    pub fn with_children(mut self, children: Vec<RawNode>) -> Self {
        self.children = Some(children);
        self
    }

    pub fn children(&self) -> &[RawNode] {
        self.children.as_deref().unwrap_or(&[])
    }

    pub fn has_children(&self) -> bool {
        !self.children().is_empty()
    }

    pub fn node_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(node.children());
        }
        count
    }
}

impl Drop for RawNode {
    // Plans can be thousands of levels deep; unlink children onto a heap
    // stack instead of letting drop glue recurse.
    fn drop(&mut self) {
        let Some(children) = self.children.take() else {
            return;
        };
        let mut stack = children;
        while let Some(mut node) = stack.pop() {
            if let Some(children) = node.children.take() {
                stack.extend(children);
            }
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PlanInput {
    Many(Vec<RawNode>),
    One(Box<RawNode>),
}

impl PlanInput {
    fn into_plans(self) -> Vec<RawNode> {
        match self {
            PlanInput::Many(plans) => plans,
            PlanInput::One(plan) => vec![*plan],
        }
    }
}

/// Parses one plan object or an array of plans.
///
/// Strict JSON is read without a nesting limit, so plan depth is bounded only
/// by memory. Input that is not valid JSON syntax is re-read as JSON5 so
/// hand-edited fixtures with comments or trailing commas still load; JSON5
/// input keeps that parser's own nesting limit.
pub fn parse_plans(input: &str) -> Result<Vec<RawNode>> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ForestError::EmptyInput);
    }
    let plans = match parse_json(trimmed) {
        Ok(plans) => plans,
        Err(json_err) if json_err.is_syntax() => match json5::from_str::<PlanInput>(trimmed) {
            Ok(parsed) => parsed.into_plans(),
            Err(json5_err) => {
                tracing::debug!(%json_err, "plan input is neither JSON nor JSON5");
                return Err(ForestError::Json5(json5_err));
            }
        },
        Err(json_err) => return Err(ForestError::Json(json_err)),
    };
    if plans.is_empty() {
        return Err(ForestError::EmptyInput);
    }
    Ok(plans)
}

fn parse_json(input: &str) -> serde_json::Result<Vec<RawNode>> {
    let mut json = serde_json::Deserializer::from_str(input);
    json.disable_recursion_limit();
    let plans = {
        let stacked = serde_stacker::Deserializer::new(&mut json);
        if input.starts_with('[') {
            Vec::<RawNode>::deserialize(stacked)?
        } else {
            vec![RawNode::deserialize(stacked)?]
        }
    };
    json.end()?;
    Ok(plans)
}
