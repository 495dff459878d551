//! # Replay Subcommand
//!
//! Mounts a person form, applies a scripted list of input events to it,
//! and prints the final form state. Useful for reproducing how the form
//! reacts to a given interaction sequence under a given configuration.
//!
//! ```yaml
//! - event: change
//!   field: firstName
//!   value: Ada
//! - event: blur
//!   field: firstName
//! - event: append
//!   array: addresses
//!   value: { country: UK }
//! - event: submit
//! ```

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use pform_core::Person;
use pform_schema::person_schema;
use pform_state::{
    FormBinder, FormOptions, FormState, PersonForm, RegisterOptions, SetValueOptions,
    SubmitOutcome, WatchEvent,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::input::load_document;

/// Arguments for the replay subcommand.
#[derive(Args, Debug)]
pub struct ReplayArgs {
    /// Event script (JSON or YAML list).
    pub script: PathBuf,

    /// Form options (JSON or YAML). Defaults to the person form options.
    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// One scripted input event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum FormEvent {
    /// Input change, converted the way the field's input converts it.
    Change { field: String, value: Value },
    /// Input lost focus.
    Blur { field: String },
    /// Imperative set.
    Set {
        field: String,
        value: Value,
        #[serde(default)]
        options: SetValueOptions,
    },
    /// Add an entry to a list.
    Append { array: String, value: Value },
    /// Remove a list entry.
    Remove { array: String, index: usize },
    /// Validate everything, or the named fields.
    Trigger {
        #[serde(default)]
        fields: Option<Vec<String>>,
    },
    /// Submit attempt.
    Submit,
    /// Reset to defaults.
    Reset,
}

/// Outcome of a replayed session.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayReport {
    /// Result of each submit event, in order.
    pub submissions: Vec<SubmitOutcome>,
    /// Records handed over by successful submits.
    pub submitted: Vec<Person>,
    /// Values after the last event.
    pub values: Value,
    /// Form state after the last event.
    pub state: FormState,
}

/// Register the inputs the person form renders, including one country and
/// city input per address present in the defaults.
pub fn mount(form: &mut PersonForm) -> anyhow::Result<()> {
    form.register("firstName")?;
    form.register("lastName")?;
    form.register_with("age", RegisterOptions::number())?;
    form.register("email")?;
    form.register_with("gender", RegisterOptions::radio())?;
    form.register_with("terms", RegisterOptions::checkbox())?;
    let entries = form
        .get_value("addresses")
        .and_then(Value::as_array)
        .map_or(0, Vec::len);
    for i in 0..entries {
        form.register(&format!("addresses.{i}.country"))?;
        form.register(&format!("addresses.{i}.city"))?;
    }
    Ok(())
}

/// Apply `events` to a freshly mounted person form.
pub fn replay(events: &[FormEvent], options: FormOptions) -> anyhow::Result<ReplayReport> {
    let mut form = FormBinder::new(person_schema(), options);
    mount(&mut form)?;
    form.watch(None, |e: &WatchEvent<'_>| {
        let name = e.name.map(ToString::to_string).unwrap_or_default();
        let value = e.name.and_then(|n| e.value_at(n));
        tracing::info!(field = %name, kind = ?e.kind, value = ?value, "form value changed");
    })?;

    let mut submissions = Vec::new();
    let mut submitted = Vec::new();

    for (step, event) in events.iter().enumerate() {
        tracing::debug!(step, ?event, "applying event");
        apply(&mut form, event, &mut submissions, &mut submitted)
            .with_context(|| format!("event {step} failed"))?;
    }

    Ok(ReplayReport {
        submissions,
        submitted,
        values: form.get_values().clone(),
        state: form.form_state(),
    })
}

fn apply(
    form: &mut PersonForm,
    event: &FormEvent,
    submissions: &mut Vec<SubmitOutcome>,
    submitted: &mut Vec<Person>,
) -> anyhow::Result<()> {
    match event {
        FormEvent::Change { field, value } => form.change(field, value.clone())?,
        FormEvent::Blur { field } => form.blur(field)?,
        FormEvent::Set {
            field,
            value,
            options,
        } => form.set_value_with(field, value.clone(), *options)?,
        FormEvent::Append { array, value } => {
            form.field_array(array)?.append(value.clone())?;
        }
        FormEvent::Remove { array, index } => {
            form.field_array(array)?.remove(*index)?;
        }
        FormEvent::Trigger { fields } => {
            let names: Option<Vec<&str>> = fields
                .as_ref()
                .map(|f| f.iter().map(String::as_str).collect());
            let valid = form.trigger(names.as_deref())?;
            tracing::info!(valid, "trigger");
        }
        FormEvent::Submit => {
            let outcome = form.handle_submit(|person| submitted.push(person));
            submissions.push(outcome);
        }
        FormEvent::Reset => form.reset(),
    }
    Ok(())
}

/// Exit status for a replayed session.
///
/// When the script submitted at least once, the last submit decides: 0 if
/// it went through, 1 if it was rejected. A successful submit may reset the
/// form to defaults that do not validate, so the final state is not used
/// then. Without a submit, 0 when the form ends valid, 1 otherwise.
pub fn exit_code(report: &ReplayReport) -> u8 {
    let ok = match report.submissions.last() {
        Some(last) => last.is_submitted(),
        None => report.state.is_valid,
    };
    u8::from(!ok)
}

/// Run the subcommand. See [`exit_code`] for the exit status.
pub fn run_replay(args: &ReplayArgs) -> anyhow::Result<u8> {
    let events: Vec<FormEvent> = load_document(&args.script)?;
    let options = match &args.config {
        Some(path) => load_document(path)?,
        None => FormOptions::person(),
    };

    let report = replay(&events, options)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(exit_code(&report))
}
