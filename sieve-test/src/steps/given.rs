use anyhow::{Error, anyhow};
use cucumber::{gherkin::Step, given};
use sieve::{ClassifyMut, Policy};

use crate::world::{ClassifierKind, ClassifierWorld, parse_items};

// =============================================================================
// Classifier Setup Steps
// =============================================================================

#[given(expr = "a {word} classifier with default policy {word}")]
fn classifier_with_default(
    world: &mut ClassifierWorld,
    kind: ClassifierKind,
    default: Policy,
) -> Result<(), Error> {
    world.start(kind, default);
    Ok(())
}

#[given(expr = "a {word} classifier")]
fn classifier(world: &mut ClassifierWorld, kind: ClassifierKind) -> Result<(), Error> {
    world.start(kind, Policy::default());
    Ok(())
}

#[given(expr = "a {word} classifier configured as:")]
fn classifier_from_config(
    world: &mut ClassifierWorld,
    step: &Step,
    kind: ClassifierKind,
) -> Result<(), Error> {
    let yaml = step
        .docstring
        .as_deref()
        .ok_or_else(|| anyhow!("Configuration step requires a docstring"))?;
    world.classifier = kind.load(yaml)?;
    world.kind = kind;
    Ok(())
}

#[given(expr = "items {string} are included")]
fn items_included(world: &mut ClassifierWorld, items: String) -> Result<(), Error> {
    let items = parse_items(&items)?;
    world
        .mutate(|classifier| classifier.try_include_all(items))
        .ok_or_else(|| anyhow!("Setup failed: {:?}", world.last_error))
}

#[given(expr = "items {string} are excluded")]
fn items_excluded(world: &mut ClassifierWorld, items: String) -> Result<(), Error> {
    let items = parse_items(&items)?;
    world
        .mutate(|classifier| classifier.try_exclude_all(items))
        .ok_or_else(|| anyhow!("Setup failed: {:?}", world.last_error))
}
