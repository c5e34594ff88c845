//! The builtin `transform` component.

use scenebridge_object::{convert, impl_accessible, AccessError, AccessorTable, Method, Property, Quat, ToWire, Value, Vec3};

/// Local position, rotation and scale relative to the structural parent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

/// Accepts either one vector argument or three numbers.
fn vector_args(method: &str, args: &[Value]) -> Result<Vec3, AccessError> {
    match args {
        [single] => convert(method, single),
        [x, y, z] => Ok(Vec3::new(
            convert(method, x)?,
            convert(method, y)?,
            convert(method, z)?,
        )),
        _ => Err(AccessError::invalid_arguments(
            method,
            format!("expected a vector or three numbers, got {} argument(s)", args.len()),
        )),
    }
}

static TRANSFORM_TABLE: AccessorTable<Transform> = AccessorTable {
    type_name: "Transform",
    properties: &[
        Property {
            name: "position",
            get: |t: &Transform| t.position.to_wire(),
            set: Some(|t: &mut Transform, v: &Value| {
                t.position = convert("position", v)?;
                Ok(())
            }),
        },
        Property {
            name: "rotation",
            get: |t: &Transform| t.rotation.to_wire(),
            set: Some(|t: &mut Transform, v: &Value| {
                t.rotation = convert("rotation", v)?;
                Ok(())
            }),
        },
        Property {
            name: "eulerAngles",
            get: |t: &Transform| t.rotation.to_euler().to_wire(),
            set: Some(|t: &mut Transform, v: &Value| {
                let angles: Vec3 = convert("eulerAngles", v)?;
                t.rotation = Quat::from_euler(angles.x, angles.y, angles.z);
                Ok(())
            }),
        },
        Property {
            name: "scale",
            get: |t: &Transform| t.scale.to_wire(),
            set: Some(|t: &mut Transform, v: &Value| {
                t.scale = convert("scale", v)?;
                Ok(())
            }),
        },
    ],
    methods: &[
        Method {
            name: "Translate",
            call: |t: &mut Transform, args: &[Value]| {
                t.position = t.position + vector_args("Translate", args)?;
                Ok(t.position.to_wire())
            },
        },
        Method {
            name: "Rotate",
            call: |t: &mut Transform, args: &[Value]| {
                let euler = vector_args("Rotate", args)?;
                t.rotation = (t.rotation * Quat::from_euler(euler.x, euler.y, euler.z)).normalized();
                Ok(t.rotation.to_wire())
            },
        },
    ],
};

impl_accessible!(Transform, TRANSFORM_TABLE);
