//! Moves attribute values between an [`AttributeSet`] and a component's [`AttrStore`].
//!
//! `bind` validates everything first and only then writes, so a rejected
//! request leaves the instance exactly as it was.

use super::descriptor::BindPhase;
use super::schema::AttrSchema;
use super::set::AttributeSet;
use super::store::Bindable;
use super::value::AttrValue;
use crate::error::ValidationError;

/// Bind `values` onto the inputs of `phase`.
///
/// Keys without a matching descriptor are ignored. Missing keys, and keys
/// holding [`AttrValue::None`], fall back to the descriptor default. The first
/// rejected value aborts the whole bind.
pub fn bind<B>(
    instance: &mut B,
    schema: &AttrSchema,
    values: &AttributeSet,
    phase: BindPhase,
) -> Result<(), ValidationError>
where
    B: Bindable + ?Sized,
{
    let mut staged: Vec<(&str, AttrValue)> = Vec::new();
    for descriptor in schema.inputs(phase) {
        let candidate = values
            .get(descriptor.name())
            .filter(|v| !v.is_none())
            .cloned()
            .unwrap_or_else(|| descriptor.default_value().clone());
        let value = descriptor.validate(candidate)?;
        staged.push((descriptor.name(), value));
    }

    let store = instance.attrs_mut();
    for (name, value) in staged {
        store.set(name, value);
    }
    Ok(())
}

/// Snapshot of the output-capable attributes currently on `instance`.
pub fn harvest<B>(instance: &B, schema: &AttrSchema) -> AttributeSet
where
    B: Bindable + ?Sized,
{
    let store = instance.attrs();
    schema
        .outputs()
        .map(|d| (d.name(), store.get(d.name()).clone()))
        .collect()
}

/// Restore every request-scoped attribute to its default.
///
/// Init-phase attributes are left alone.
pub fn reset<B>(instance: &mut B, schema: &AttrSchema)
where
    B: Bindable + ?Sized,
{
    let store = instance.attrs_mut();
    for descriptor in schema.request_scoped() {
        store.set(descriptor.name(), descriptor.default_value().clone());
    }
}
