//! The lenient `boutiques-0.5` dialect.
//!
//! Mirrors the published Boutiques 0.5 descriptor format: unknown members
//! are ignored, and inputs are told apart by `type`, `list` and the
//! presence of `command-line-flag`.

mod containers;
mod descriptor;
mod inputs;
mod outputs;

pub use containers::{DockerContainerImage, LegacyContainerImage, RootfsContainerImage};
pub use descriptor::{
    EnvironmentVariable, ErrorCode, Group, LegacyDescriptor, OutputAssertion, TestAssertions,
    TestCase,
};
pub use inputs::{
    CommandLineFlaggedFileInput, CommandLineFlaggedFileListInput, CommandLineFlaggedFloatInput,
    CommandLineFlaggedFloatListInput, CommandLineFlaggedIntegerInput,
    CommandLineFlaggedIntegerListInput, CommandLineFlaggedStringInput,
    CommandLineFlaggedStringListInput, FileInput, FileListInput, FlagInput, FloatInput,
    FloatListInput, IntegerInput, IntegerListInput, LegacyFileValue, LegacyFloatValue,
    LegacyInput, LegacyInputBase, LegacyIntegerValue, LegacyValue, StringInput, StringListInput,
};
pub use outputs::{
    ConditionalPath, ConditionalPathTemplateOutput, LegacyOutput, LegacyOutputBase,
    PathCondition, PathTemplateOutput,
};
