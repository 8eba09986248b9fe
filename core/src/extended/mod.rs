//! The strict `boutiques-styx-descriptor-1` dialect.
//!
//! Every object rejects undeclared members, value keys must look like
//! `[NAME]`, and inputs may nest whole sub-commands.

mod command;
mod descriptor;
mod inputs;
mod outputs;

pub use command::{CommandBody, SubCommand};
pub use descriptor::{ExtendedContainerImage, ExtendedDescriptor};
pub use inputs::{
    CommandLineFlaggedFileInput, CommandLineFlaggedFileListInput, CommandLineFlaggedFloatInput,
    CommandLineFlaggedFloatListInput, CommandLineFlaggedIntegerInput,
    CommandLineFlaggedIntegerListInput, CommandLineFlaggedStringInput,
    CommandLineFlaggedStringListInput, CommandLineFlaggedSubCommandInput,
    CommandLineFlaggedSubCommandListInput, CommandLineFlaggedSubCommandUnionInput,
    CommandLineFlaggedSubCommandUnionListInput, ExtendedFileValue, ExtendedFloatValue,
    ExtendedInput, ExtendedInputBase, ExtendedIntegerValue, ExtendedValue, FileInput,
    FileListInput, FlagInput, FloatInput, FloatListInput, IntegerInput, IntegerListInput,
    StringInput, StringListInput, SubCommandInput, SubCommandListInput, SubCommandUnionInput,
    SubCommandUnionListInput, SubCommandUnionValue, SubCommandValue,
};
pub use outputs::{ExtendedOutput, StreamOutput};
