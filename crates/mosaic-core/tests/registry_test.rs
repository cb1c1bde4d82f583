//! Registry behavior tests: matching, structural invariants, atomicity.

use mosaic_core::prelude::*;
use serde_json::json;
use std::any::Any;
use std::sync::Arc;

struct Dog {
    sound: String,
}

impl Extension for Dog {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

struct Cat;

impl Extension for Cat {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

fn animal_point() -> ExtensionDescriptor {
    ExtensionDescriptor::point("animal").with_capability("animal")
}

fn dog_class() -> ExtensionDescriptor {
    ExtensionDescriptor::class("Dog")
        .with_name("dog")
        .with_capability("animal")
        .with_factory(|ctor| {
            let sound = ctor
                .args()
                .get("sound")
                .and_then(Value::as_str)
                .unwrap_or("woof")
                .to_string();
            Ok(Box::new(Dog { sound }))
        })
}

fn cat_class() -> ExtensionDescriptor {
    ExtensionDescriptor::class("Cat")
        .with_name("cat")
        .with_capability("animal")
        .with_factory(|_| Ok(Box::new(Cat)))
}

#[test]
fn lookup_resolves_the_registered_class_exactly_once() {
    let mut registry = ExtensionRegistry::new();
    registry.register_point(animal_point()).unwrap();
    registry.register_class(dog_class()).unwrap();

    let first = registry.lookup("animal", "dog").unwrap();
    let second = registry.lookup("animal", "dog").unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(first.id(), "Dog");

    let names: Vec<_> = registry.names_for("animal").unwrap().collect();
    assert_eq!(names.iter().filter(|n| **n == "dog").count(), 1);
}

#[test]
fn hierarchy_conflict_fails_in_both_registration_orders() {
    // Contract {animal} is a subset of {animal, mammal}: every class
    // matching the stricter point would also match the looser one.
    let base = || ExtensionDescriptor::point("animal").with_capability("animal");
    let narrow = || {
        ExtensionDescriptor::point("mammal").with_capabilities(["animal", "mammal"])
    };

    let mut registry = ExtensionRegistry::new();
    registry.register_point(base()).unwrap();
    let err = registry.register_point(narrow()).unwrap_err();
    assert!(matches!(err, RegistryError::HierarchyConflict { .. }));

    let mut registry = ExtensionRegistry::new();
    registry.register_point(narrow()).unwrap();
    let err = registry.register_point(base()).unwrap_err();
    assert!(matches!(err, RegistryError::HierarchyConflict { .. }));

    // The failed registration left no trace.
    assert!(registry.has_point("mammal"));
    assert!(!registry.has_point("animal"));
}

#[test]
fn name_collision_fails_second_and_keeps_first() {
    let mut registry = ExtensionRegistry::new();
    registry.register_point(animal_point()).unwrap();
    registry.register_class(dog_class()).unwrap();

    let impostor = ExtensionDescriptor::class("Impostor")
        .with_name("dog")
        .with_capability("animal")
        .with_factory(|_| Ok(Box::new(Cat)));
    let err = registry.register_class(impostor).unwrap_err();
    assert!(matches!(
        err,
        RegistryError::NameCollision { ref existing, .. } if existing == "Dog"
    ));

    // First registration untouched.
    assert_eq!(registry.lookup("animal", "dog").unwrap().id(), "Dog");
    assert_eq!(registry.names_for("animal").unwrap().count(), 1);
}

#[test]
fn class_matching_no_point_leaves_tables_unchanged() {
    let mut registry = ExtensionRegistry::new();
    registry.register_point(animal_point()).unwrap();
    registry
        .register_point(ExtensionDescriptor::point("plant").with_capability("plant"))
        .unwrap();
    registry.register_class(dog_class()).unwrap();

    let before: Vec<Vec<String>> = registry
        .point_ids()
        .map(|p| p.to_string())
        .collect::<Vec<_>>()
        .iter()
        .map(|p| {
            registry
                .names_for(p)
                .unwrap()
                .map(str::to_string)
                .collect()
        })
        .collect();

    let stray = ExtensionDescriptor::class("Rock")
        .with_name("rock")
        .with_capability("mineral")
        .with_factory(|_| Ok(Box::new(Cat)));
    let err = registry.register_class(stray).unwrap_err();
    assert!(matches!(err, RegistryError::NoMatchingPoint { .. }));

    let after: Vec<Vec<String>> = registry
        .point_ids()
        .map(|p| p.to_string())
        .collect::<Vec<_>>()
        .iter()
        .map(|p| {
            registry
                .names_for(p)
                .unwrap()
                .map(str::to_string)
                .collect()
        })
        .collect();
    assert_eq!(before, after);
}

#[test]
fn instantiate_passes_ctor_args_and_reports_missing_names() {
    let mut registry = ExtensionRegistry::new();
    registry.register_point(animal_point()).unwrap();
    registry.register_class(dog_class()).unwrap();
    registry.register_class(cat_class()).unwrap();

    let dog = registry
        .instantiate("animal", "dog", &json!({"sound": "woof"}))
        .unwrap();
    assert_eq!(dog.as_any().downcast_ref::<Dog>().unwrap().sound, "woof");

    let err = registry
        .instantiate("animal", "fish", &Value::Null)
        .map(|_| ())
        .unwrap_err();
    assert!(matches!(
        err,
        RegistryError::NotFound { ref name, .. } if name == "fish"
    ));
    assert!(err.to_string().contains("fish"));
}

#[test]
fn names_and_extensions_come_back_in_registration_order() {
    let mut registry = ExtensionRegistry::new();
    registry.register_point(animal_point()).unwrap();
    registry.register_class(cat_class()).unwrap();
    registry.register_class(dog_class()).unwrap();

    let names: Vec<_> = registry.names_for("animal").unwrap().collect();
    assert_eq!(names, vec!["cat", "dog"]);

    // Restartable: a second call starts over.
    let again: Vec<_> = registry.names_for("animal").unwrap().collect();
    assert_eq!(again, names);

    let args = Value::Null;
    let order: Vec<_> = registry
        .extensions_for("animal", &args)
        .unwrap()
        .map(|(name, instance)| {
            assert!(instance.is_ok());
            name.to_string()
        })
        .collect();
    assert_eq!(order, vec!["cat", "dog"]);
}

#[test]
fn unknown_point_is_reported_for_enumeration_and_lookup() {
    let registry = ExtensionRegistry::new();
    assert!(matches!(
        registry.names_for("ghost").map(|_| ()).unwrap_err(),
        RegistryError::UnknownPoint { .. }
    ));
    assert!(matches!(
        registry.lookup("ghost", "dog").unwrap_err(),
        RegistryError::UnknownPoint { .. }
    ));
}
