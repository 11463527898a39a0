use anyhow::{Error, anyhow};
use cucumber::{gherkin::Step, then};
use sieve::config::ConfigError;
use sieve::{ClassifierError, Classify, ClassifyExt, Policy, observationally_eq};

use crate::world::{ClassifierKind, ClassifierWorld, Item, parse_items};

// =============================================================================
// Single Item Steps
// =============================================================================

#[then(expr = "item {int} is included")]
fn item_included(world: &mut ClassifierWorld, item: Item) -> Result<(), Error> {
    if world.classifier.should_include(&item) {
        Ok(())
    } else {
        Err(anyhow!("Item {} should be included but is excluded", item))
    }
}

#[then(expr = "item {int} is excluded")]
fn item_excluded(world: &mut ClassifierWorld, item: Item) -> Result<(), Error> {
    if world.classifier.should_exclude(&item) {
        Ok(())
    } else {
        Err(anyhow!("Item {} should be excluded but is included", item))
    }
}

#[then(expr = "item {int} has an explicit {word} override")]
fn item_explicit(world: &mut ClassifierWorld, item: Item, policy: Policy) -> Result<(), Error> {
    match world.classifier.policy_of(&item) {
        Some(registered) if registered == policy => Ok(()),
        other => Err(anyhow!(
            "Item {} should carry a {} override, found {:?}",
            item,
            policy,
            other
        )),
    }
}

#[then(expr = "item {int} has no override")]
fn item_has_no_override(world: &mut ClassifierWorld, item: Item) -> Result<(), Error> {
    match world.classifier.policy_of(&item) {
        None => Ok(()),
        Some(policy) => Err(anyhow!("Item {} still carries a {} override", item, policy)),
    }
}

#[then("items resolve as:")]
fn items_resolve_as(world: &mut ClassifierWorld, step: &Step) -> Result<(), Error> {
    let table = step
        .table
        .as_ref()
        .ok_or_else(|| anyhow!("Resolution step requires a table"))?;

    // First row is the header: | item | policy |
    for row in table.rows.iter().skip(1) {
        let [item, expected] = row.as_slice() else {
            return Err(anyhow!("Expected two columns, got {:?}", row));
        };
        let item: Item = item.trim().parse()?;
        let expected: Policy = expected.trim().parse()?;
        let actual = world.classifier.resolve(&item);
        if actual != expected {
            return Err(anyhow!(
                "Item {} resolved to {}, expected {}",
                item,
                actual,
                expected
            ));
        }
    }
    Ok(())
}

// =============================================================================
// Collection Steps
// =============================================================================

#[then(expr = "the explicit {word} items are {string}")]
fn explicit_items(
    world: &mut ClassifierWorld,
    policy: Policy,
    items: String,
) -> Result<(), Error> {
    let mut expected = parse_items(&items)?;
    expected.sort_unstable();
    let mut actual: Vec<Item> = world.classifier.explicit_items(policy).collect();
    actual.sort_unstable();

    if actual == expected {
        Ok(())
    } else {
        Err(anyhow!(
            "Explicit {} items mismatch: expected {:?}, got {:?}",
            policy,
            expected,
            actual
        ))
    }
}

#[then(expr = "the classifier has {int} override(s)")]
fn override_count(world: &mut ClassifierWorld, count: usize) -> Result<(), Error> {
    let actual = world.classifier.override_count();
    if actual == count {
        Ok(())
    } else {
        Err(anyhow!("Expected {} overrides, got {}", count, actual))
    }
}

#[then(expr = "the default policy is {word}")]
fn default_policy(world: &mut ClassifierWorld, policy: Policy) -> Result<(), Error> {
    let actual = world.classifier.default_policy();
    if actual == policy {
        Ok(())
    } else {
        Err(anyhow!("Default policy is {}, expected {}", actual, policy))
    }
}

#[then(expr = "any of {string} resolves to {word}")]
fn any_resolves_to(
    world: &mut ClassifierWorld,
    items: String,
    policy: Policy,
) -> Result<(), Error> {
    let items = parse_items(&items)?;
    let found = match policy {
        Policy::Include => world.classifier.any_included(&items),
        Policy::Exclude => world.classifier.any_excluded(&items),
    };
    if found {
        Ok(())
    } else {
        Err(anyhow!("None of {:?} resolves to {}", items, policy))
    }
}

#[then(expr = "none of {string} resolves to {word}")]
fn none_resolves_to(
    world: &mut ClassifierWorld,
    items: String,
    policy: Policy,
) -> Result<(), Error> {
    let items = parse_items(&items)?;
    let found = match policy {
        Policy::Include => world.classifier.any_included(&items),
        Policy::Exclude => world.classifier.any_excluded(&items),
    };
    if found {
        Err(anyhow!("Some of {:?} resolves to {}", items, policy))
    } else {
        Ok(())
    }
}

#[then(expr = "items {string} pass")]
fn items_pass(world: &mut ClassifierWorld, items: String) -> Result<(), Error> {
    let items = parse_items(&items)?;
    if world.classifier.should_pass(&items) {
        Ok(())
    } else {
        let rejected: Vec<_> = world.classifier.excluded(&items).collect();
        Err(anyhow!("Items {:?} are excluded", rejected))
    }
}

// =============================================================================
// Result Steps
// =============================================================================

#[then(expr = "the reset reports {word}")]
fn reset_reports(world: &mut ClassifierWorld, removed: bool) -> Result<(), Error> {
    match world.last_reset {
        Some(actual) if actual == removed => Ok(()),
        other => Err(anyhow!("Reset returned {:?}, expected {}", other, removed)),
    }
}

#[then(expr = "the operation is rejected as unsupported {string}")]
fn rejected_as_unsupported(
    world: &mut ClassifierWorld,
    operation: String,
) -> Result<(), Error> {
    match &world.last_error {
        Some(ClassifierError::UnsupportedOperation { operation: actual })
            if *actual == operation =>
        {
            Ok(())
        }
        other => Err(anyhow!(
            "Expected unsupported `{}` error, got {:?}",
            operation,
            other
        )),
    }
}

#[then("the operation succeeds")]
fn operation_succeeds(world: &mut ClassifierWorld) -> Result<(), Error> {
    match &world.last_error {
        None => Ok(()),
        Some(error) => Err(anyhow!("Operation failed: {}", error)),
    }
}

#[then(expr = "loading fails with a conflict on item {int}")]
fn config_conflict(world: &mut ClassifierWorld, item: Item) -> Result<(), Error> {
    match &world.config_error {
        Some(ConfigError::Conflict { item: actual }) if *actual == item.to_string() => Ok(()),
        other => Err(anyhow!(
            "Expected conflict on item {}, got {:?}",
            item,
            other
        )),
    }
}

#[then("loading fails with a parse error")]
fn config_parse_error(world: &mut ClassifierWorld) -> Result<(), Error> {
    match &world.config_error {
        Some(ConfigError::Parse(_)) => Ok(()),
        other => Err(anyhow!("Expected parse error, got {:?}", other)),
    }
}

// =============================================================================
// Equality Steps
// =============================================================================

#[then(expr = "it equals a {word} classifier with the same overrides")]
fn equals_rebuilt(world: &mut ClassifierWorld, kind: ClassifierKind) -> Result<(), Error> {
    let other = world.rebuild_as(kind)?;
    let forward = observationally_eq(&world.classifier, &other);
    let backward = observationally_eq(&other, &world.classifier);
    if forward && backward {
        Ok(())
    } else {
        Err(anyhow!("Classifier differs from its {:?} rebuild", kind))
    }
}

#[then(expr = "it equals an empty {word} classifier with default policy {word}")]
fn equals_empty(
    world: &mut ClassifierWorld,
    kind: ClassifierKind,
    policy: Policy,
) -> Result<(), Error> {
    let empty = kind.build(policy);
    if observationally_eq(&world.classifier, &empty) {
        Ok(())
    } else {
        Err(anyhow!(
            "Classifier differs from an empty {:?} classifier with default {}",
            kind,
            policy
        ))
    }
}

#[then(expr = "it differs from an empty {word} classifier with default policy {word}")]
fn differs_from_empty(
    world: &mut ClassifierWorld,
    kind: ClassifierKind,
    policy: Policy,
) -> Result<(), Error> {
    let empty = kind.build(policy);
    if observationally_eq(&world.classifier, &empty) {
        Err(anyhow!(
            "Classifier unexpectedly equals an empty {:?} classifier",
            kind
        ))
    } else {
        Ok(())
    }
}

#[then("the clone equals the classifier")]
fn clone_equals(world: &mut ClassifierWorld) -> Result<(), Error> {
    if observationally_eq(world.copy()?, &world.classifier) {
        Ok(())
    } else {
        Err(anyhow!("Clone differs from the classifier"))
    }
}

#[then("the clone differs from the classifier")]
fn clone_differs(world: &mut ClassifierWorld) -> Result<(), Error> {
    if observationally_eq(world.copy()?, &world.classifier) {
        Err(anyhow!("Clone still equals the classifier"))
    } else {
        Ok(())
    }
}

#[then(expr = "item {int} resolves to {word} in the clone")]
fn clone_resolves(world: &mut ClassifierWorld, item: Item, policy: Policy) -> Result<(), Error> {
    let actual = world.copy()?.resolve(&item);
    if actual == policy {
        Ok(())
    } else {
        Err(anyhow!(
            "Item {} resolves to {} in the clone, expected {}",
            item,
            actual,
            policy
        ))
    }
}

// =============================================================================
// Logging Steps
// =============================================================================

#[then(expr = "{int} {string} event(s) was/were logged")]
fn events_logged(
    world: &mut ClassifierWorld,
    count: usize,
    message: String,
) -> Result<(), Error> {
    let actual = world.events.count(&message);
    if actual == count {
        Ok(())
    } else {
        Err(anyhow!(
            "Expected {} {:?} events, got {}. Captured: {:?}",
            count,
            message,
            actual,
            world.events.messages()
        ))
    }
}

#[then(expr = "the last {string} event has {word} = {string}")]
fn event_field(
    world: &mut ClassifierWorld,
    message: String,
    field: String,
    value: String,
) -> Result<(), Error> {
    let event = world
        .events
        .last(&message)
        .ok_or_else(|| anyhow!("No {:?} event captured", message))?;
    match event.field(&field) {
        Some(actual) if actual == value => Ok(()),
        other => Err(anyhow!(
            "Field {} of {:?} is {:?}, expected {:?}",
            field,
            message,
            other,
            value
        )),
    }
}
