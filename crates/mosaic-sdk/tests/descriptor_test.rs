//! Descriptor and export-macro tests from a plugin author's point of view.

use mosaic_sdk::prelude::*;
use std::any::Any;

#[derive(Default)]
struct Sensor {
    unit: String,
}

impl Extension for Sensor {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

mosaic_sdk::declare_extensions!(__weather_extensions__, [
    ExtensionDescriptor::class("Sensor")
        .with_name("thermometer")
        .with_capability("sensor")
        .with_version(semver::Version::new(0, 1, 0))
        .with_factory(|ctor| {
            let unit = ctor
                .args()
                .get("unit")
                .and_then(Value::as_str)
                .unwrap_or("celsius")
                .to_string();
            Ok(Box::new(Sensor { unit }))
        }),
]);

#[test]
fn exported_descriptors_carry_declarations() {
    let descriptors = __weather_extensions__();
    assert_eq!(descriptors.len(), 1);

    let sensor = &descriptors[0];
    assert_eq!(sensor.id, "Sensor");
    assert_eq!(sensor.name.as_deref(), Some("thermometer"));
    assert_eq!(sensor.version, Some(semver::Version::new(0, 1, 0)));
    assert!(sensor
        .capabilities
        .contains(&Capability::from_static("sensor")));
}

#[test]
fn exported_factory_reads_ctor_args() {
    let descriptors = __weather_extensions__();
    let factory = descriptors[0].factory.clone().unwrap();

    let args = serde_json::json!({"unit": "kelvin"});
    let instance = factory(CtorArgs::Args(&args)).unwrap();
    let sensor = instance.as_any().downcast_ref::<Sensor>().unwrap();
    assert_eq!(sensor.unit, "kelvin");

    let instance = factory(CtorArgs::Args(&Value::Null)).unwrap();
    let sensor = instance.as_any().downcast_ref::<Sensor>().unwrap();
    assert_eq!(sensor.unit, "celsius");
}
