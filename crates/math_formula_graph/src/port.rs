// SPDX-License-Identifier: MIT OR Apache-2.0
//! Port definitions for node inputs/outputs.

use math_formula::SocketValue;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a port
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PortId(pub Uuid);

impl PortId {
    /// Create a new random port ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PortId {
    fn default() -> Self {
        Self::new()
    }
}

/// Port direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PortDirection {
    /// Input port
    Input,
    /// Output port
    Output,
}

/// Data type that can flow through ports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PortType {
    /// Geometry being passed along the chain
    Geometry,
    /// Floating point value
    Float,
    /// 3D vector
    Vector3,
    /// Text, used for attribute names
    String,
}

impl PortType {
    /// Check if this type can connect to another type
    pub fn can_connect_to(&self, other: &PortType) -> bool {
        // Floats are broadcast into vectors
        self == other || matches!((self, other), (Self::Float, Self::Vector3))
    }
}

/// Value that can be stored in a port
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PortValue {
    /// Float
    Float(f32),
    /// 3D vector
    Vector3([f32; 3]),
    /// String
    String(String),
}

impl PortValue {
    /// Get the port type for this value
    pub fn port_type(&self) -> PortType {
        match self {
            Self::Float(_) => PortType::Float,
            Self::Vector3(_) => PortType::Vector3,
            Self::String(_) => PortType::String,
        }
    }
}

impl From<SocketValue> for PortValue {
    fn from(value: SocketValue) -> Self {
        match value {
            SocketValue::Float(value) => Self::Float(value),
            SocketValue::Vector(vector) => Self::Vector3(vector),
            SocketValue::Text(text) => Self::String(text),
        }
    }
}

/// A port on a node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Port {
    /// Unique port ID
    pub id: PortId,
    /// Port name
    pub name: String,
    /// Port direction
    pub direction: PortDirection,
    /// Data type
    pub port_type: PortType,
    /// Default value (for inputs)
    pub default_value: Option<PortValue>,
    /// Whether multiple connections are allowed
    pub multi_connect: bool,
}

impl Port {
    /// Create a new input port
    pub fn input(name: impl Into<String>, port_type: PortType) -> Self {
        Self {
            id: PortId::new(),
            name: name.into(),
            direction: PortDirection::Input,
            port_type,
            default_value: None,
            multi_connect: false,
        }
    }

    /// Create a new output port
    pub fn output(name: impl Into<String>, port_type: PortType) -> Self {
        Self {
            id: PortId::new(),
            name: name.into(),
            direction: PortDirection::Output,
            port_type,
            default_value: None,
            multi_connect: true,
        }
    }

    /// Set the default value
    pub fn with_default(mut self, value: PortValue) -> Self {
        self.default_value = Some(value);
        self
    }

    /// Copy of this port with a fresh ID, for a new node instance
    pub fn instantiate(&self) -> Self {
        Self {
            id: PortId::new(),
            ..self.clone()
        }
    }

    /// Check if a connection to another port is valid
    pub fn can_connect(&self, other: &Port) -> bool {
        // Must be opposite directions
        if self.direction == other.direction {
            return false;
        }

        self.port_type.can_connect_to(&other.port_type)
    }

    /// Store a default value, checking it fits the port
    pub fn set_default(&mut self, value: PortValue) -> Result<(), PortValueError> {
        if value.port_type() != self.port_type {
            return Err(PortValueError {
                port: self.name.clone(),
                expected: self.port_type,
                found: value.port_type(),
            });
        }
        self.default_value = Some(value);
        Ok(())
    }
}

/// Error when a default value does not match the port type
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("port `{port}` holds {expected:?} values, got {found:?}")]
pub struct PortValueError {
    /// Port name
    pub port: String,
    /// Port type
    pub expected: PortType,
    /// Type of the rejected value
    pub found: PortType,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_compatibility() {
        let out = Port::output("Geometry", PortType::Geometry);
        let input = Port::input("Geometry", PortType::Geometry);
        assert!(out.can_connect(&input));
        assert!(!out.can_connect(&out.instantiate()));
        assert!(!out.can_connect(&Port::input("A Float", PortType::Float)));
        assert!(PortType::Float.can_connect_to(&PortType::Vector3));
        assert!(!PortType::Vector3.can_connect_to(&PortType::Float));
    }

    #[test]
    fn test_instantiate_gets_new_id() {
        let port = Port::input("Result", PortType::String)
            .with_default(PortValue::String("Result".into()));
        let copy = port.instantiate();
        assert_ne!(port.id, copy.id);
        assert_eq!(copy.name, "Result");
        assert_eq!(copy.default_value, port.default_value);
    }

    #[test]
    fn test_set_default_checks_type() {
        let mut port = Port::input("A Float", PortType::Float);
        port.set_default(PortValue::Float(2.0)).unwrap();
        assert_eq!(port.default_value, Some(PortValue::Float(2.0)));

        let err = port.set_default(PortValue::String("x".into())).unwrap_err();
        assert_eq!(err.expected, PortType::Float);
        assert_eq!(err.found, PortType::String);
    }

    #[test]
    fn test_socket_value_conversion() {
        assert_eq!(
            PortValue::from(SocketValue::Vector([1.0, 2.0, 3.0])),
            PortValue::Vector3([1.0, 2.0, 3.0])
        );
        assert_eq!(PortValue::from(SocketValue::Text("a".into())).port_type(), PortType::String);
    }
}
