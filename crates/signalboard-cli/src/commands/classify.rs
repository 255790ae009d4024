//! Classify command implementation.
//!
//! Runs individual names through the taxonomy and golden-signal mapper,
//! without a snapshot.

use std::io::Write;

use signalboard_core::{BuilderConfig, Taxonomy, ValueType, map_signals};

use crate::cli::ClassifyArgs;
use crate::error::CliError;
use crate::output::{ClassificationList, ClassifiedName, OutputFormat};

/// Classify command executor.
pub struct ClassifyCommand {
    taxonomy: Taxonomy,
}

impl ClassifyCommand {
    /// Create a classify command using the configured taxonomy.
    ///
    /// # Errors
    ///
    /// Returns an error if a taxonomy override does not compile.
    pub fn new(config: &BuilderConfig) -> Result<Self, CliError> {
        Ok(Self {
            taxonomy: config.taxonomy()?,
        })
    }

    /// Execute the classify command.
    ///
    /// # Errors
    ///
    /// Returns an error if output fails.
    pub async fn execute<W: Write>(
        &self,
        writer: &mut W,
        format: &OutputFormat,
        args: &ClassifyArgs,
    ) -> Result<(), CliError> {
        let value_type = if args.non_numeric {
            ValueType::String
        } else {
            ValueType::Numeric
        };
        let list = self.classify(&args.names, value_type);
        format.write(writer, &list)?;
        Ok(())
    }

    /// Classify names in input order.
    #[must_use]
    pub fn classify(&self, names: &[String], value_type: ValueType) -> ClassificationList {
        ClassificationList {
            names: names
                .iter()
                .map(|name| ClassifiedName {
                    name: name.clone(),
                    category: self.taxonomy.classify(name),
                    signals: map_signals(&self.taxonomy, name, value_type)
                        .into_iter()
                        .collect(),
                })
                .collect(),
        }
    }
}
