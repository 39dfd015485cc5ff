//! Factories linked into the host and registered before any search path is
//! scanned.

use avogadro_plugin_sdk::{
    Capability, CapabilityFactory, CapabilityInstance, Category, Color, Engine, Owner,
};

use crate::config::BuiltinConstructor;
use crate::error::PluginError;

pub const BALL_AND_STICK: &str = "Ball and Stick";
pub const ELEMENT_COLOR: &str = "Color by Element";

pub fn default_builtins() -> Vec<BuiltinConstructor> {
    vec![ball_and_stick, element_color]
}

fn ball_and_stick() -> Result<Box<dyn CapabilityFactory>, PluginError> {
    Ok(Box::new(BallAndStickFactory))
}

fn element_color() -> Result<Box<dyn CapabilityFactory>, PluginError> {
    Ok(Box::new(ElementColorFactory))
}

#[derive(Debug)]
pub struct BallAndStickEngine {
    owner: Owner,
}

impl BallAndStickEngine {
    pub fn owner(&self) -> &Owner {
        &self.owner
    }
}

impl Capability for BallAndStickEngine {
    fn name(&self) -> &str {
        BALL_AND_STICK
    }
}

impl Engine for BallAndStickEngine {}

#[derive(Debug, Default)]
pub struct BallAndStickFactory;

impl CapabilityFactory for BallAndStickFactory {
    fn name(&self) -> &str {
        BALL_AND_STICK
    }

    fn description(&self) -> &str {
        "Renders atoms as spheres and bonds as cylinders"
    }

    fn category(&self) -> Category {
        Category::Engine
    }

    fn create_instance(&self, owner: &Owner) -> CapabilityInstance {
        CapabilityInstance::Engine(Box::new(BallAndStickEngine {
            owner: owner.clone(),
        }))
    }
}

#[derive(Debug)]
pub struct ElementColor {
    owner: Owner,
}

impl ElementColor {
    pub fn owner(&self) -> &Owner {
        &self.owner
    }
}

impl Capability for ElementColor {
    fn name(&self) -> &str {
        ELEMENT_COLOR
    }
}

impl Color for ElementColor {}

#[derive(Debug, Default)]
pub struct ElementColorFactory;

impl CapabilityFactory for ElementColorFactory {
    fn name(&self) -> &str {
        ELEMENT_COLOR
    }

    fn description(&self) -> &str {
        "Colors atoms by their element"
    }

    fn category(&self) -> Category {
        Category::Color
    }

    fn create_instance(&self, owner: &Owner) -> CapabilityInstance {
        CapabilityInstance::Color(Box::new(ElementColor {
            owner: owner.clone(),
        }))
    }
}
