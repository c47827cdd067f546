use std::io::{self, IsTerminal};

use crate::cli::{UserFieldArgs, UserUpdateArgs};
use crate::commands::prompt;
use crate::context::{UserApi, UserContext};
use crate::display::{compact_line, format_location, UserCard, UserRow};
use crate::error::{Result, UsersError};
use crate::form::{CreateMode, FormMachine, FormMode, SubmitOutcome, UpdateMode, ValidationError};
use crate::locations::Locations;
use crate::notify::{ConsoleNotifier, Notifier};
use crate::output;
use crate::types::Field;

const TEXT_FIELDS: [Field; 3] = [Field::Name, Field::Email, Field::Phone];

pub async fn list<A: UserApi>(ctx: &UserContext<A>) -> Result<()> {
    ctx.get_users().await?;
    let users = ctx.users();

    if users.is_empty() && output::format() != output::OutputFormat::Json {
        output::print_message("No users found");
        return Ok(());
    }

    output::print_list(&users, |u| UserRow::from(u), compact_line);
    Ok(())
}

pub async fn show<A: UserApi>(ctx: &UserContext<A>, id: &str) -> Result<()> {
    ctx.get_users().await?;
    let user = ctx
        .find(id)
        .ok_or_else(|| UsersError::UserNotFound(id.to_string()))?;

    output::print_item(&user, |u| UserCard::new(u).print());
    Ok(())
}

pub async fn create<A: UserApi>(
    ctx: &UserContext<A>,
    locations: &Locations,
    args: UserFieldArgs,
) -> Result<()> {
    let notifier = ConsoleNotifier;
    let form = FormMachine::new(ctx, locations, &notifier, CreateMode);
    run_form(form, &notifier, &args).await
}

pub async fn update<A: UserApi>(
    ctx: &UserContext<A>,
    locations: &Locations,
    args: UserUpdateArgs,
) -> Result<()> {
    ctx.get_users().await?;
    let user = ctx
        .find(&args.id)
        .ok_or_else(|| UsersError::UserNotFound(args.id.clone()))?;

    let notifier = ConsoleNotifier;
    let form = FormMachine::new(ctx, locations, &notifier, UpdateMode::new(user));
    run_form(form, &notifier, &args.fields).await
}

/// Drive a form from flags and, on a terminal, prompts. Interactive runs
/// stay open after a failed submit so the user can correct and retry.
async fn run_form<A: UserApi, M: FormMode>(
    mut form: FormMachine<'_, A, M>,
    notifier: &dyn Notifier,
    args: &UserFieldArgs,
) -> Result<()> {
    let interactive = !args.no_input && io::stdin().is_terminal();

    form.open()?;
    apply_flags(&mut form, args)?;
    if interactive && args.is_empty() && form.mode().tracks_record() {
        prompt_edit(&mut form)?;
    }

    loop {
        if interactive {
            prompt_missing(&mut form)?;
        }

        match form.submit().await? {
            SubmitOutcome::Saved { .. } => return Ok(()),
            SubmitOutcome::Invalid(e) if interactive => clear_invalid(&mut form, &e)?,
            SubmitOutcome::Invalid(e) => return Err(e.into()),
            SubmitOutcome::Failed { message } => {
                if !interactive || !prompt::confirm("Edit and retry?")? {
                    form.cancel()?;
                    return Err(UsersError::Persistence(message));
                }
                if refresh_tracked(&mut form).await {
                    notifier.error("This user changed on the server; the form was reloaded");
                }
                prompt_edit(&mut form)?;
            }
        }
    }
}

fn apply_flags<A: UserApi, M: FormMode>(
    form: &mut FormMachine<'_, A, M>,
    args: &UserFieldArgs,
) -> Result<()> {
    let values = [&args.name, &args.email, &args.phone];
    for (field, value) in TEXT_FIELDS.into_iter().zip(values) {
        if let Some(value) = value {
            form.set_field(field, value.as_str())?;
        }
    }

    if let Some(region) = &args.region {
        let known = form.selector().region_options().iter().any(|r| &r.name == region);
        if !known {
            return Err(UsersError::UnknownRegion(region.clone()));
        }
        form.select_region(region)?;
    }

    if let Some(commune) = &args.commune {
        if !form.commune_enabled() || !form.selector().is_candidate(commune) {
            return Err(UsersError::UnknownCommune {
                region: form.selector().region().to_string(),
                commune: commune.clone(),
            });
        }
        form.select_commune(commune)?;
    }

    Ok(())
}

/// Ask for every field that is still empty. Region and commune are picked
/// from menus so only enumerated options can be chosen.
fn prompt_missing<A: UserApi, M: FormMode>(form: &mut FormMachine<'_, A, M>) -> Result<()> {
    for field in TEXT_FIELDS {
        if form.draft().get(field).is_empty() {
            let value = prompt::ask(field.label())?;
            form.set_field(field, value)?;
        }
    }

    if form.draft().region.is_empty() {
        let names: Vec<String> = form
            .selector()
            .region_options()
            .iter()
            .map(|r| r.name.clone())
            .collect();
        if let Some(region) = prompt::choose("Region", &names)? {
            form.select_region(&region)?;
        }
    }

    if form.draft().commune.is_empty() && form.commune_enabled() {
        let communes = form.commune_options().to_vec();
        if let Some(commune) = prompt::choose("Commune", &communes)? {
            form.select_commune(&commune)?;
        }
    }

    Ok(())
}

/// Offer every field for editing; an empty answer keeps the current value.
fn prompt_edit<A: UserApi, M: FormMode>(form: &mut FormMachine<'_, A, M>) -> Result<()> {
    for field in TEXT_FIELDS {
        let label = format!("{} [{}]", field.label(), form.draft().get(field));
        let value = prompt::ask(&label)?;
        if !value.is_empty() {
            form.set_field(field, value)?;
        }
    }

    let location = format_location(&form.draft().region, &form.draft().commune);
    if prompt::confirm(&format!("Change location ({location})?"))? {
        // Unset the region so the next prompt pass offers both menus again.
        form.select_region("")?;
    }

    Ok(())
}

/// Blank the field a validation error points at so the next prompt pass
/// asks for it again.
fn clear_invalid<A: UserApi, M: FormMode>(
    form: &mut FormMachine<'_, A, M>,
    error: &ValidationError,
) -> Result<()> {
    match error {
        ValidationError::MissingField => Ok(()),
        ValidationError::InvalidEmail => form.set_field(Field::Email, ""),
        ValidationError::InvalidPhone => form.set_field(Field::Phone, ""),
    }
}

async fn refresh_tracked<A: UserApi, M: FormMode>(form: &mut FormMachine<'_, A, M>) -> bool {
    if !form.mode().tracks_record() {
        return false;
    }
    if let Err(e) = form.context().get_users().await {
        tracing::warn!(error = %e, "failed to refresh user list");
        return false;
    }
    form.sync()
}
