use anyhow::Error;
use cucumber::{gherkin::Step, when};
use sieve::{ClassifyMut, Policy};

use crate::world::{ClassifierKind, ClassifierWorld, Item, parse_items};

// =============================================================================
// Mutation Steps
// =============================================================================

#[when(expr = "item {int} is included")]
fn include(world: &mut ClassifierWorld, item: Item) -> Result<(), Error> {
    world.mutate(|classifier| classifier.try_include(item));
    Ok(())
}

#[when(expr = "item {int} is excluded")]
fn exclude(world: &mut ClassifierWorld, item: Item) -> Result<(), Error> {
    world.mutate(|classifier| classifier.try_exclude(item));
    Ok(())
}

#[when(expr = "items {string} are included")]
fn include_all(world: &mut ClassifierWorld, items: String) -> Result<(), Error> {
    let items = parse_items(&items)?;
    world.mutate(|classifier| classifier.try_include_all(items));
    Ok(())
}

#[when(expr = "items {string} are excluded")]
fn exclude_all(world: &mut ClassifierWorld, items: String) -> Result<(), Error> {
    let items = parse_items(&items)?;
    world.mutate(|classifier| classifier.try_exclude_all(items));
    Ok(())
}

#[when(expr = "item {int} is reset")]
fn reset(world: &mut ClassifierWorld, item: Item) -> Result<(), Error> {
    world.last_reset = world.mutate(|classifier| classifier.try_reset(&item));
    Ok(())
}

#[when("the classifier is cleared")]
fn clear(world: &mut ClassifierWorld) -> Result<(), Error> {
    world.mutate(|classifier| classifier.try_clear());
    Ok(())
}

#[when(expr = "the default policy is set to {word}")]
fn set_default(world: &mut ClassifierWorld, policy: Policy) -> Result<(), Error> {
    world.mutate(|classifier| classifier.try_set_default_policy(policy));
    Ok(())
}

// =============================================================================
// View and Configuration Steps
// =============================================================================

#[when("the classifier is cloned")]
fn clone_classifier(world: &mut ClassifierWorld) -> Result<(), Error> {
    world.copy = Some(world.classifier.clone());
    Ok(())
}

#[when("the classifier is made read-only")]
fn make_read_only(world: &mut ClassifierWorld) -> Result<(), Error> {
    world.make_read_only();
    Ok(())
}

#[when(expr = "a {word} classifier is loaded from:")]
fn load_config(
    world: &mut ClassifierWorld,
    step: &Step,
    kind: ClassifierKind,
) -> Result<(), Error> {
    let yaml = step.docstring.as_deref().unwrap_or_default();
    match kind.load(yaml) {
        Ok(classifier) => {
            world.classifier = classifier;
            world.kind = kind;
            world.config_error = None;
        }
        Err(error) => world.config_error = Some(error),
    }
    Ok(())
}
