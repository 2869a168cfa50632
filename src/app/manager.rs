use super::user_io::{prompt_confirm, prompt_id, prompt_int, prompt_menu_options, prompt_str, warn};
use super::App;
use crate::core::{ReportFile, WeeklyRun};
use crate::domain::model::{Member, Service, User, UserType};
use crate::domain::ports::{Storage, Terminal};
use crate::domain::schema::{
    EditableRecord, ADDRESS_LIMIT, CITY_LIMIT, NAME_LIMIT, PERSON_ID_DIGITS, PRICE_CENTS_MAX,
    PRICE_DOLLARS_MAX, SERVICE_ID_DIGITS, SERVICE_NAME_LIMIT, STATE_LEN, ZIPCODE_LEN,
};
use crate::utils::error::{ChocAnError, ErrorCategory, Result};
use crate::utils::validation::Validate;

const MANAGER_MENU: [&str; 4] = ["Member", "Provider", "Provider Directory", "Reports"];
const MEMBER_MENU: [&str; 3] = ["Add Member", "Update Member", "Remove Member"];
const PROVIDER_MENU: [&str; 3] = ["Add Provider", "Update Provider", "Remove Provider"];
const DIRECTORY_MENU: [&str; 3] = ["Add Service", "Update Service", "Remove Service"];
const REPORTS_MENU: [&str; 4] = [
    "Member Reports",
    "Provider Reports",
    "Summary Report",
    "All Weekly Reports",
];

struct Contact {
    name: String,
    address: String,
    city: String,
    state: String,
    zipcode: String,
}

fn prompt_contact(term: &mut dyn Terminal) -> Option<Contact> {
    Some(Contact {
        name: prompt_str(term, "Name", Some(NAME_LIMIT))?,
        address: prompt_str(term, "Street address", Some(ADDRESS_LIMIT))?,
        city: prompt_str(term, "City", Some(CITY_LIMIT))?,
        state: prompt_str(term, "State", Some(STATE_LEN..=STATE_LEN))?.to_ascii_uppercase(),
        zipcode: prompt_str(term, "Zip code", Some(ZIPCODE_LEN..=ZIPCODE_LEN))?,
    })
}

/// Picks one editable field of `T` and asks for its new value.
fn prompt_field_update<T: EditableRecord>(term: &mut dyn Terminal) -> Result<Option<(String, String)>> {
    let Some((_, field)) = prompt_menu_options(term, "Field to update", T::EDITABLE_FIELDS)? else {
        return Ok(None);
    };
    let prompt = format!("New {}", field.replace('_', " "));
    let value = if field == "password" {
        term.read_secret(&prompt)
    } else {
        term.read_line(&prompt)
    };
    Ok(value.map(|value| (field, value)))
}

/// Tells the manager why `thing` was not `verb`.
fn report_failure(term: &mut dyn Terminal, error: &ChocAnError, thing: &str, verb: &str) {
    tracing::debug!("{} was not {}: {}", thing, verb, error);
    let message = match error {
        ChocAnError::IdSpaceExhausted { .. } => format!("No new {} added.", thing.to_lowercase()),
        e if e.category() == ErrorCategory::Storage => format!(
            "There was an issue accessing the database. {} was not {}.",
            thing, verb
        ),
        e => format!("{} {} was not {}.", e, thing, verb),
    };
    warn(term, &message);
}

fn finish<T>(term: &mut dyn Terminal, outcome: Result<Option<T>>, thing: &str, verb: &str) -> Option<T> {
    outcome.unwrap_or_else(|e| {
        report_failure(term, &e, thing, verb);
        None
    })
}

impl<S: Storage> App<S> {
    pub async fn manager_menu(&self, term: &mut dyn Terminal) -> Result<()> {
        loop {
            let Some((choice, _)) = prompt_menu_options(term, "Manager Menu", &MANAGER_MENU)? else {
                tracing::info!("Manager logged out");
                return Ok(());
            };
            match choice {
                0 => self.member_menu(term).await?,
                1 => self.provider_records_menu(term).await?,
                2 => self.directory_menu(term).await?,
                _ => self.reports_menu(term).await?,
            }
        }
    }

    async fn member_menu(&self, term: &mut dyn Terminal) -> Result<()> {
        while let Some((choice, _)) = prompt_menu_options(term, "Member Menu", &MEMBER_MENU)? {
            match choice {
                0 => {
                    self.add_member_record(term).await;
                }
                1 => {
                    self.update_member_record(term).await;
                }
                _ => {
                    self.remove_member_record(term).await;
                }
            }
        }
        Ok(())
    }

    async fn provider_records_menu(&self, term: &mut dyn Terminal) -> Result<()> {
        while let Some((choice, _)) = prompt_menu_options(term, "Provider Records Menu", &PROVIDER_MENU)? {
            match choice {
                0 => {
                    self.add_provider_record(term).await;
                }
                1 => {
                    self.update_provider_record(term).await;
                }
                _ => {
                    self.remove_provider_record(term).await;
                }
            }
        }
        Ok(())
    }

    async fn directory_menu(&self, term: &mut dyn Terminal) -> Result<()> {
        while let Some((choice, _)) = prompt_menu_options(term, "Provider Directory Menu", &DIRECTORY_MENU)? {
            match choice {
                0 => {
                    self.add_provider_directory_record(term).await;
                }
                1 => {
                    self.update_provider_directory_record(term).await;
                }
                _ => {
                    self.remove_provider_directory_record(term).await;
                }
            }
        }
        Ok(())
    }

    async fn reports_menu(&self, term: &mut dyn Terminal) -> Result<()> {
        while let Some((choice, _)) = prompt_menu_options(term, "Reports Menu", &REPORTS_MENU)? {
            match choice {
                0 => {
                    self.generate_member_report(term).await;
                }
                1 => {
                    self.generate_provider_report(term).await;
                }
                2 => {
                    self.generate_summary_report(term).await;
                }
                _ => {
                    self.generate_weekly_reports(term).await;
                }
            }
        }
        Ok(())
    }

    pub async fn add_member_record(&self, term: &mut dyn Terminal) -> Option<Member> {
        let outcome = self.try_add_member(term).await;
        finish(term, outcome, "Member", "added")
    }

    async fn try_add_member(&self, term: &mut dyn Terminal) -> Result<Option<Member>> {
        let Some(contact) = prompt_contact(term) else {
            return Ok(None);
        };
        let member = Member {
            member_id: self.database.generate_unique_id::<Member>().await?,
            name: contact.name,
            address: contact.address,
            city: contact.city,
            state: contact.state,
            zipcode: contact.zipcode,
            suspended: false,
        };
        self.database.add_records(vec![member.clone()]).await?;
        term.write_line(&format!("Member {} added with ID {}.", member.name, member.member_id));
        Ok(Some(member))
    }

    pub async fn update_member_record(&self, term: &mut dyn Terminal) -> Option<Member> {
        let outcome = self.try_update_member(term).await;
        finish(term, outcome, "Member", "updated")
    }

    async fn try_update_member(&self, term: &mut dyn Terminal) -> Result<Option<Member>> {
        let Some(member_id) = prompt_id(term, "Member ID", PERSON_ID_DIGITS) else {
            return Ok(None);
        };
        let Some(member) = self.database.find::<Member>(&member_id).await? else {
            term.write_line(&format!("Member {} was not found.", member_id));
            return Ok(None);
        };
        term.write_line(&format!("Updating member {} ({})", member.member_id, member.name));

        let Some((field, value)) = prompt_field_update::<Member>(term)? else {
            return Ok(None);
        };
        let updated: Member = self
            .database
            .update_record(&member_id, &[(field.as_str(), value.as_str())])
            .await?;
        term.write_line(&format!("Member {} updated.", updated.member_id));
        Ok(Some(updated))
    }

    pub async fn remove_member_record(&self, term: &mut dyn Terminal) -> Option<Member> {
        let outcome = self.try_remove_member(term).await;
        finish(term, outcome, "Member", "removed")
    }

    async fn try_remove_member(&self, term: &mut dyn Terminal) -> Result<Option<Member>> {
        let Some(member_id) = prompt_id(term, "Member ID", PERSON_ID_DIGITS) else {
            return Ok(None);
        };
        let Some(member) = self.database.find::<Member>(&member_id).await? else {
            term.write_line(&format!("Member {} was not found.", member_id));
            return Ok(None);
        };
        if prompt_confirm(term, &format!("Remove member {} ({})?", member.member_id, member.name)) != Some(true) {
            term.write_line("Member was not removed.");
            return Ok(None);
        }

        self.database.remove_record::<Member>(&member_id).await?;
        term.write_line(&format!("Member {} removed.", member_id));
        Ok(Some(member))
    }

    pub async fn add_provider_record(&self, term: &mut dyn Terminal) -> Option<User> {
        let outcome = self.try_add_provider(term).await;
        finish(term, outcome, "Provider", "added")
    }

    async fn try_add_provider(&self, term: &mut dyn Terminal) -> Result<Option<User>> {
        let Some(contact) = prompt_contact(term) else {
            return Ok(None);
        };
        let password = loop {
            match term.read_secret("Initial password") {
                None => return Ok(None),
                Some(p) if p.is_empty() => term.write_line("Password may not be empty."),
                Some(p) => break p,
            }
        };

        let provider = User {
            id: self.database.generate_unique_id::<User>().await?,
            user_type: UserType::Provider,
            name: contact.name,
            address: contact.address,
            city: contact.city,
            state: contact.state,
            zipcode: contact.zipcode,
            password_hash: super::generate_secure_password(&password),
        };
        self.database.add_records(vec![provider.clone()]).await?;
        term.write_line(&format!("Provider {} added with ID {}.", provider.name, provider.id));
        Ok(Some(provider))
    }

    /// Looks up a user and only hands it back if it is a provider.
    async fn find_provider(&self, term: &mut dyn Terminal) -> Result<Option<User>> {
        let Some(provider_id) = prompt_id(term, "Provider ID", PERSON_ID_DIGITS) else {
            return Ok(None);
        };
        match self.database.find::<User>(&provider_id).await? {
            Some(user) if user.user_type == UserType::Provider => Ok(Some(user)),
            Some(_) => {
                warn(term, &format!("User {} is not a provider.", provider_id));
                Ok(None)
            }
            None => {
                term.write_line(&format!("Provider {} was not found.", provider_id));
                Ok(None)
            }
        }
    }

    pub async fn update_provider_record(&self, term: &mut dyn Terminal) -> Option<User> {
        let outcome = self.try_update_provider(term).await;
        finish(term, outcome, "Provider", "updated")
    }

    async fn try_update_provider(&self, term: &mut dyn Terminal) -> Result<Option<User>> {
        let Some(provider) = self.find_provider(term).await? else {
            return Ok(None);
        };
        term.write_line(&format!("Updating provider {} ({})", provider.id, provider.name));

        let Some((field, value)) = prompt_field_update::<User>(term)? else {
            return Ok(None);
        };
        let updated: User = self
            .database
            .update_record(&provider.id, &[(field.as_str(), value.as_str())])
            .await?;
        term.write_line(&format!("Provider {} updated.", updated.id));
        Ok(Some(updated))
    }

    pub async fn remove_provider_record(&self, term: &mut dyn Terminal) -> Option<User> {
        let outcome = self.try_remove_provider(term).await;
        finish(term, outcome, "Provider", "removed")
    }

    async fn try_remove_provider(&self, term: &mut dyn Terminal) -> Result<Option<User>> {
        let Some(provider) = self.find_provider(term).await? else {
            return Ok(None);
        };
        if prompt_confirm(term, &format!("Remove provider {} ({})?", provider.id, provider.name)) != Some(true) {
            term.write_line("Provider was not removed.");
            return Ok(None);
        }

        self.database.remove_record::<User>(&provider.id).await?;
        term.write_line(&format!("Provider {} removed.", provider.id));
        Ok(Some(provider))
    }

    pub async fn add_provider_directory_record(&self, term: &mut dyn Terminal) -> Option<Service> {
        let outcome = self.try_add_service(term).await;
        finish(term, outcome, "Service", "added")
    }

    async fn try_add_service(&self, term: &mut dyn Terminal) -> Result<Option<Service>> {
        let Some(service_name) = prompt_str(term, "Service name", Some(SERVICE_NAME_LIMIT)) else {
            return Ok(None);
        };
        let Some(price_dollars) = prompt_int(term, "Price dollars", None, Some(0..=PRICE_DOLLARS_MAX)) else {
            return Ok(None);
        };
        let Some(price_cents) = prompt_int(term, "Price cents", None, Some(0..=PRICE_CENTS_MAX)) else {
            return Ok(None);
        };

        let service = Service {
            service_id: self.database.generate_unique_id::<Service>().await?,
            service_name,
            price_dollars,
            price_cents,
        };
        service.validate()?;
        self.database.add_records(vec![service.clone()]).await?;
        term.write_line(&format!(
            "Service {} added with code {}.",
            service.service_name, service.service_id
        ));
        Ok(Some(service))
    }

    pub async fn update_provider_directory_record(&self, term: &mut dyn Terminal) -> Option<Service> {
        let outcome = self.try_update_service(term).await;
        finish(term, outcome, "Service", "updated")
    }

    async fn try_update_service(&self, term: &mut dyn Terminal) -> Result<Option<Service>> {
        let Some(service_id) = prompt_id(term, "Service code", SERVICE_ID_DIGITS) else {
            return Ok(None);
        };
        let Some(service) = self.database.find::<Service>(&service_id).await? else {
            term.write_line(&format!("Service {} was not found.", service_id));
            return Ok(None);
        };
        term.write_line(&format!("Updating service {} ({})", service.service_id, service.service_name));

        let Some((field, value)) = prompt_field_update::<Service>(term)? else {
            return Ok(None);
        };
        let updated: Service = self
            .database
            .update_record(&service_id, &[(field.as_str(), value.as_str())])
            .await?;
        term.write_line(&format!("Service {} updated.", updated.service_id));
        Ok(Some(updated))
    }

    pub async fn remove_provider_directory_record(&self, term: &mut dyn Terminal) -> Option<Service> {
        let outcome = self.try_remove_service(term).await;
        finish(term, outcome, "Service", "removed")
    }

    async fn try_remove_service(&self, term: &mut dyn Terminal) -> Result<Option<Service>> {
        let Some(service_id) = prompt_id(term, "Service code", SERVICE_ID_DIGITS) else {
            return Ok(None);
        };
        let Some(service) = self.database.find::<Service>(&service_id).await? else {
            term.write_line(&format!("Service {} was not found.", service_id));
            return Ok(None);
        };
        if prompt_confirm(term, &format!("Remove service {} ({})?", service.service_id, service.service_name))
            != Some(true)
        {
            term.write_line("Service was not removed.");
            return Ok(None);
        }

        self.database.remove_record::<Service>(&service_id).await?;
        term.write_line(&format!("Service {} removed.", service_id));
        Ok(Some(service))
    }

    fn show_written(&self, term: &mut dyn Terminal, files: &[ReportFile]) {
        if files.is_empty() {
            term.write_line(&format!(
                "No records found within the last {} days.",
                self.reports.window_days()
            ));
            return;
        }
        for file in files {
            term.write_line(&format!("Report saved to {}", file.location));
        }
    }

    pub async fn generate_member_report(&self, term: &mut dyn Terminal) -> Option<Vec<ReportFile>> {
        let outcome = self.reports.generate_member_reports(self.today()).await.map(Some);
        let files = finish(term, outcome, "Member report", "generated")?;
        self.show_written(term, &files);
        Some(files)
    }

    pub async fn generate_provider_report(&self, term: &mut dyn Terminal) -> Option<Vec<ReportFile>> {
        let outcome = self.reports.generate_provider_reports(self.today()).await.map(Some);
        let files = finish(term, outcome, "Provider report", "generated")?;
        self.show_written(term, &files);
        Some(files)
    }

    pub async fn generate_summary_report(&self, term: &mut dyn Terminal) -> Option<ReportFile> {
        let outcome = self.reports.generate_summary_report(self.today()).await.map(Some);
        let file = finish(term, outcome, "Summary report", "generated")?;
        let files: Vec<ReportFile> = file.iter().cloned().collect();
        self.show_written(term, &files);
        file
    }

    pub async fn generate_weekly_reports(&self, term: &mut dyn Terminal) -> Option<WeeklyRun> {
        let outcome = self.reports.run(self.today()).await.map(Some);
        let run = finish(term, outcome, "Weekly report", "generated")?;
        let files: Vec<ReportFile> = run.files().cloned().chain(run.archive.clone()).collect();
        self.show_written(term, &files);
        Some(run)
    }
}

#[cfg(test)]
mod tests {
    use crate::adapters::ScriptedTerminal;
    use crate::app::{verify_password, App};
    use crate::core::{Database, ReportEngine, ReportWriter};
    use crate::domain::model::{Member, Service, User, UserType};
    use crate::testing::{date, log_entry, member, service, user, MockStorage};
    use chrono::{DateTime, TimeZone, Utc};

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 12, 8, 12, 0, 0).unwrap()
    }

    async fn app() -> (MockStorage, App<MockStorage>) {
        let db = Database::new(MockStorage::default());
        db.add_records(vec![member(137002632, "Donald")]).await.unwrap();
        db.add_records(vec![
            user(940672921, UserType::Provider, "Case Hall", "pw"),
            user(333333333, UserType::Manager, "Ann", "secret"),
        ])
        .await
        .unwrap();
        db.add_records(vec![service(598470, "Dietitian", 150, 49)]).await.unwrap();

        let reports = MockStorage::default();
        let engine = ReportEngine::new(db.clone(), ReportWriter::new(reports.clone()));
        (reports, App::new(db, engine).with_clock(fixed_now))
    }

    #[tokio::test]
    async fn test_add_member_record() {
        let (_, app) = app().await;
        let mut term = ScriptedTerminal::new(["Martha", "12 Oak Ave", "Portland", "or", "97201"]);

        let added = app.add_member_record(&mut term).await.unwrap();

        assert_eq!(added.member_id, 137002633);
        assert_eq!(added.state, "OR");
        assert!(!added.suspended);
        let stored: Option<Member> = app.database().find(&137002633).await.unwrap();
        assert_eq!(stored, Some(added));
    }

    #[tokio::test]
    async fn test_add_member_invalid_zip() {
        let (_, app) = app().await;
        let mut term = ScriptedTerminal::new(["Martha", "12 Oak Ave", "Portland", "OR", "9720A"]);

        assert!(app.add_member_record(&mut term).await.is_none());
        assert!(term.transcript().contains("Member was not added."));
        let members: Vec<Member> = app.database().load_all().await.unwrap();
        assert_eq!(members.len(), 1);
    }

    #[tokio::test]
    async fn test_add_member_storage_failure() {
        let db = Database::new(MockStorage::failing_writes());
        let engine = ReportEngine::new(db.clone(), ReportWriter::new(MockStorage::default()));
        let app = App::new(db, engine);
        let mut term = ScriptedTerminal::new(["Martha", "12 Oak Ave", "Portland", "OR", "97201"]);

        assert!(app.add_member_record(&mut term).await.is_none());
        assert!(term
            .transcript()
            .contains("There was an issue accessing the database. Member was not added."));
    }

    #[tokio::test]
    async fn test_add_member_ids_exhausted() {
        let (_, app) = app().await;
        app.database()
            .add_records(vec![member(999999999, "Last")])
            .await
            .unwrap();
        let mut term = ScriptedTerminal::new(["Martha", "12 Oak Ave", "Portland", "OR", "97201"]);

        assert!(app.add_member_record(&mut term).await.is_none());
        assert!(term.transcript().contains("No new member added."));
    }

    #[tokio::test]
    async fn test_update_member_record() {
        let (_, app) = app().await;
        // field 6 is "suspended"
        let mut term = ScriptedTerminal::new(["137002632", "6", "yes"]);

        let updated = app.update_member_record(&mut term).await.unwrap();

        assert!(updated.suspended);
    }

    #[tokio::test]
    async fn test_update_unknown_member() {
        let (_, app) = app().await;
        let mut term = ScriptedTerminal::new(["222222222"]);

        assert!(app.update_member_record(&mut term).await.is_none());
        assert!(term.transcript().contains("Member 222222222 was not found."));
    }

    #[tokio::test]
    async fn test_remove_member_record_needs_confirmation() {
        let (_, app) = app().await;
        let mut term = ScriptedTerminal::new(["137002632", "n"]);
        assert!(app.remove_member_record(&mut term).await.is_none());

        let mut term = ScriptedTerminal::new(["137002632", "y"]);
        assert!(app.remove_member_record(&mut term).await.is_some());
        let members: Vec<Member> = app.database().load_all().await.unwrap();
        assert!(members.is_empty());
    }

    #[tokio::test]
    async fn test_add_provider_and_reset_password() {
        let (_, app) = app().await;
        let mut term = ScriptedTerminal::new(["Joe", "1 Elm St", "Salem", "OR", "97301", "", "first"]);

        let provider = app.add_provider_record(&mut term).await.unwrap();
        assert_eq!(provider.user_type, UserType::Provider);
        assert_eq!(provider.id, 940672922);
        assert!(term.transcript().contains("Password may not be empty."));
        assert!(verify_password("first", &provider.password_hash));

        // field 6 is "password"
        let mut term = ScriptedTerminal::new(["940672922", "6", "second"]);
        let updated = app.update_provider_record(&mut term).await.unwrap();
        assert!(verify_password("second", &updated.password_hash));
        assert!(!term.transcript().contains("second"));
    }

    #[tokio::test]
    async fn test_manager_cannot_be_removed_as_provider() {
        let (_, app) = app().await;
        let mut term = ScriptedTerminal::new(["333333333", "y"]);

        assert!(app.remove_provider_record(&mut term).await.is_none());
        assert!(term.transcript().contains("User 333333333 is not a provider."));
        let users: Vec<User> = app.database().load_all().await.unwrap();
        assert_eq!(users.len(), 2);
    }

    #[tokio::test]
    async fn test_provider_directory_records() {
        let (_, app) = app().await;
        let mut term = ScriptedTerminal::new(["Massage", "1000", "85", "0"]);
        let added = app.add_provider_directory_record(&mut term).await.unwrap();
        assert_eq!(added.service_id, 598471);
        assert_eq!(added.fee().to_string(), "85.00");

        // field 2 is "price_dollars"
        let mut term = ScriptedTerminal::new(["598471", "2", "90"]);
        let updated = app.update_provider_directory_record(&mut term).await.unwrap();
        assert_eq!(updated.price_dollars, 90);

        let mut term = ScriptedTerminal::new(["598470", "yes"]);
        app.remove_provider_directory_record(&mut term).await.unwrap();
        let services: Vec<Service> = app.database().load_all().await.unwrap();
        assert_eq!(services, vec![updated]);
    }

    #[tokio::test]
    async fn test_reports_menu_with_no_records() {
        let (_, app) = app().await;
        // Reports -> Summary Report, then back out of both menus
        let mut term = ScriptedTerminal::new(["4", "3"]);

        app.manager_menu(&mut term).await.unwrap();

        assert!(term
            .transcript()
            .contains("No records found within the last 7 days."));
    }

    #[tokio::test]
    async fn test_weekly_reports() {
        let (reports, app) = app().await;
        app.database()
            .add_records(vec![log_entry(
                Utc.with_ymd_and_hms(2023, 12, 5, 16, 0, 0).unwrap(),
                date(12, 5, 2023),
                940672921,
                137002632,
                598470,
            )])
            .await
            .unwrap();
        let mut term = ScriptedTerminal::new(Vec::<String>::new());

        let run = app.generate_weekly_reports(&mut term).await.unwrap();

        assert_eq!(run.member_reports.len(), 1);
        assert_eq!(run.provider_reports.len(), 1);
        assert!(term.transcript().contains("Report saved to mock/summary_"));
        assert_eq!(reports.file_names().await.len(), 3);
    }
}
