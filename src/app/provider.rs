use super::user_io::{prompt_confirm, prompt_date, prompt_id, prompt_menu_options, prompt_str, warn};
use super::App;
use crate::domain::model::{Member, MemberStatus, Service, ServiceLogEntry};
use crate::domain::ports::{Storage, Terminal};
use crate::domain::schema::{COMMENTS_MAX, PERSON_ID_DIGITS, SERVICE_ID_DIGITS};
use crate::utils::error::Result;

const PROVIDER_MENU: [&str; 3] = ["Request Provider Directory", "Record Service", "Member Check-In"];

/// Member number from the card reader or typed in; both arrive as a line of input.
pub fn prompt_member_id(term: &mut dyn Terminal) -> Option<u32> {
    prompt_id(term, "Member ID", PERSON_ID_DIGITS)
}

impl<S: Storage> App<S> {
    /// Runs until the provider ends input.
    pub async fn show_provider_menu(&self, term: &mut dyn Terminal, provider_id: u32) -> Result<()> {
        loop {
            let Some((choice, _)) = prompt_menu_options(term, "Provider Menu", &PROVIDER_MENU)? else {
                tracing::info!("Provider {} logged out", provider_id);
                return Ok(());
            };

            let outcome = match choice {
                0 => self.request_provider_directory(term).await,
                1 => match prompt_member_id(term) {
                    Some(member_id) => self
                        .record_service_billing_entry(term, provider_id, member_id)
                        .await
                        .map(|_| ()),
                    None => Ok(()),
                },
                _ => match prompt_member_id(term) {
                    Some(member_id) => self.display_member_information(term, member_id).await.map(|_| ()),
                    None => Ok(()),
                },
            };

            if let Err(e) = outcome {
                tracing::debug!("Provider menu action failed: {}", e);
                warn(term, &e.user_friendly_message());
            }
        }
    }

    /// Prints the member's status, and name when the member exists.
    pub async fn display_member_information(
        &self,
        term: &mut dyn Terminal,
        member_id: u32,
    ) -> Result<MemberStatus> {
        let member: Option<Member> = self.database.find(&member_id).await?;
        let status = MemberStatus::of(member.as_ref());

        if let Some(member) = &member {
            term.write_line(&format!("Member Name: {}", member.name));
        }
        term.write_line(&format!("Member ID: {}", member_id));
        term.write_line(&format!("Status: {}", status));
        tracing::debug!("Member {} checked in as {}", member_id, status);
        Ok(status)
    }

    /// Records one service for a valid member. `None` if the member is not valid
    /// or the provider backs out.
    pub async fn record_service_billing_entry(
        &self,
        term: &mut dyn Terminal,
        provider_id: u32,
        member_id: u32,
    ) -> Result<Option<ServiceLogEntry>> {
        let status = self.display_member_information(term, member_id).await?;
        if status != MemberStatus::Valid {
            warn(term, &format!("Member is {}. No service was recorded.", status));
            return Ok(None);
        }

        // Service dates may not be in the future, in local or UTC terms.
        let latest = self.today().min(self.now().date_naive());
        let Some(service_date) = prompt_date(term, "Date of service", None, Some(latest))? else {
            return Ok(None);
        };

        let Some(service) = self.prompt_service(term).await? else {
            return Ok(None);
        };

        let Some(comments) = prompt_str(term, "Comments (optional)", Some(0..=COMMENTS_MAX)) else {
            return Ok(None);
        };

        let entry = ServiceLogEntry {
            entry_datetime_utc: self.now(),
            service_date,
            provider_id,
            member_id,
            service_id: service.service_id,
            comments: Some(comments.trim().to_string()).filter(|c| !c.is_empty()),
        };
        self.database.add_records(vec![entry.clone()]).await?;

        tracing::info!(
            "Provider {} billed service {} for member {}",
            provider_id,
            service.service_id,
            member_id
        );
        term.write_line(&format!("Fee to be paid: {}", service.fee()));
        term.write_line("Service Billing Entry Recorded Successfully");
        Ok(Some(entry))
    }

    /// Asks for a service code until a known one is confirmed.
    async fn prompt_service(&self, term: &mut dyn Terminal) -> Result<Option<Service>> {
        loop {
            let Some(service_id) = prompt_id(term, "Service code", SERVICE_ID_DIGITS) else {
                return Ok(None);
            };
            let Some(service) = self.database.find::<Service>(&service_id).await? else {
                term.write_line(&format!("Service code {} was not found.", service_id));
                continue;
            };

            term.write_line(&format!("Service: {} ({})", service.service_name, service.fee()));
            match prompt_confirm(term, "Is this the correct service?") {
                Some(true) => return Ok(Some(service)),
                Some(false) => continue,
                None => return Ok(None),
            }
        }
    }

    pub async fn request_provider_directory(&self, term: &mut dyn Terminal) -> Result<()> {
        let file = self.reports.export_provider_directory().await?;
        term.write_line(&format!("Provider directory saved to {}", file.location));
        Ok(())
    }
}
