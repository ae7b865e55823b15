use crate::config::DocumentSchema;
use crate::tables::DamageRange;
use crate::xml::Element;

/// Old and new rendering of a damage element that was rewritten.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DamageEdit {
    pub old: String,
    pub new: String,
}

/// Overwrite min/max on the level's damage element when they differ.
/// A level without a damage element is left alone; one is never created.
pub fn update_damage(
    level: &mut Element,
    range: DamageRange,
    schema: &DocumentSchema,
) -> Option<DamageEdit> {
    let damage = level.child_mut(&schema.damage)?;
    let new_min = range.min.to_string();
    let new_max = range.max.to_string();
    let old_min = damage.attr(&schema.damage_min).map(str::to_string);
    let old_max = damage.attr(&schema.damage_max).map(str::to_string);
    if old_min.as_deref() == Some(new_min.as_str()) && old_max.as_deref() == Some(new_max.as_str())
    {
        return None;
    }
    let old = render_damage(old_min.as_deref(), old_max.as_deref());
    damage.set_attr(&schema.damage_min, new_min);
    damage.set_attr(&schema.damage_max, new_max);
    Some(DamageEdit {
        old,
        new: range.to_string(),
    })
}

/// Remove every damage element of the level; returns the removed renderings.
pub fn remove_damage(level: &mut Element, schema: &DocumentSchema) -> Vec<String> {
    let removed = level
        .children_named(&schema.damage)
        .map(|d| render_damage(d.attr(&schema.damage_min), d.attr(&schema.damage_max)))
        .collect();
    level.remove_children_named(&schema.damage);
    removed
}

pub fn render_damage(min: Option<&str>, max: Option<&str>) -> String {
    match (min, max) {
        (None, None) => "None".to_string(),
        (min, max) => format!("{}-{}", min.unwrap_or("None"), max.unwrap_or("None")),
    }
}
