//! Weekly report contents, computed from the record tables.
//!
//! Builders here are pure: they take already-loaded tables and a window and
//! return typed reports. Writing them out is `report_writer`'s job.

use crate::domain::model::{Member, Money, Service, ServiceLogEntry, User};
use chrono::{DateTime, Days, NaiveDate, Utc};
use std::collections::{BTreeMap, HashMap};

/// Most consultations a provider is credited with in one week.
pub const CONSULTATION_CAP: u32 = 999;
/// Most a provider can be paid in one week.
pub const WEEK_FEE_CAP: Money = Money::from_cents(9_999_999);

/// The calendar days a report covers, inclusive at both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportWindow {
    first: NaiveDate,
    last: NaiveDate,
}

impl ReportWindow {
    /// The `days` days ending on `last` (a window is at least one day).
    pub fn ending_on(last: NaiveDate, days: u32) -> Self {
        let span = u64::from(days.max(1) - 1);
        let first = last.checked_sub_days(Days::new(span)).unwrap_or(NaiveDate::MIN);
        Self { first, last }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.first <= date && date <= self.last
    }

    pub fn first(&self) -> NaiveDate {
        self.first
    }

    pub fn last(&self) -> NaiveDate {
        self.last
    }

    pub fn days(&self) -> i64 {
        (self.last - self.first).num_days() + 1
    }
}

/// Everything a weekly run reads.
#[derive(Debug, Clone, Default)]
pub struct ReportTables {
    pub members: Vec<Member>,
    pub users: Vec<User>,
    pub services: Vec<Service>,
    pub service_log: Vec<ServiceLogEntry>,
}

struct ResolvedEntry<'a> {
    entry: &'a ServiceLogEntry,
    member: &'a Member,
    provider: &'a User,
    service: &'a Service,
}

/// Log entries inside the window joined with their member, provider and service.
fn resolve_entries<'a>(tables: &'a ReportTables, window: &ReportWindow) -> Vec<ResolvedEntry<'a>> {
    let members: HashMap<u32, &Member> = tables.members.iter().map(|m| (m.member_id, m)).collect();
    let users: HashMap<u32, &User> = tables.users.iter().map(|u| (u.id, u)).collect();
    let services: HashMap<u32, &Service> =
        tables.services.iter().map(|s| (s.service_id, s)).collect();

    let mut resolved = Vec::new();
    for entry in tables.service_log.iter().filter(|e| window.contains(e.service_date)) {
        let (Some(member), Some(provider), Some(service)) = (
            members.get(&entry.member_id),
            users.get(&entry.provider_id),
            services.get(&entry.service_id),
        ) else {
            tracing::warn!(
                "Skipping service log entry {} (member {}, provider {}, service {}): unknown reference",
                entry.entry_datetime_utc,
                entry.member_id,
                entry.provider_id,
                entry.service_id
            );
            continue;
        };
        resolved.push(ResolvedEntry {
            entry,
            member,
            provider,
            service,
        });
    }
    resolved
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberServiceLine {
    pub service_date: NaiveDate,
    pub provider_name: String,
    pub service_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberReport {
    pub member: Member,
    pub services: Vec<MemberServiceLine>,
}

/// One report per member seen in the window, services in date order.
pub fn build_member_reports(tables: &ReportTables, window: &ReportWindow) -> Vec<MemberReport> {
    let mut by_member: BTreeMap<u32, MemberReport> = BTreeMap::new();

    for resolved in resolve_entries(tables, window) {
        by_member
            .entry(resolved.member.member_id)
            .or_insert_with(|| MemberReport {
                member: resolved.member.clone(),
                services: Vec::new(),
            })
            .services
            .push(MemberServiceLine {
                service_date: resolved.entry.service_date,
                provider_name: resolved.provider.name.clone(),
                service_name: resolved.service.service_name.clone(),
            });
    }

    let mut reports: Vec<MemberReport> = by_member.into_values().collect();
    for report in &mut reports {
        report.services.sort_by(|a, b| {
            (a.service_date, &a.provider_name, &a.service_name).cmp(&(
                b.service_date,
                &b.provider_name,
                &b.service_name,
            ))
        });
    }
    reports
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderServiceLine {
    pub service_date: NaiveDate,
    pub received: DateTime<Utc>,
    pub member_name: String,
    pub member_id: u32,
    pub service_id: u32,
    pub fee: Money,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderReport {
    pub provider: User,
    pub services: Vec<ProviderServiceLine>,
    pub consultations: u32,
    pub total_fee: Money,
}

/// One report per provider who billed in the window, services in the order received.
pub fn build_provider_reports(tables: &ReportTables, window: &ReportWindow) -> Vec<ProviderReport> {
    let mut by_provider: BTreeMap<u32, (User, Vec<ProviderServiceLine>)> = BTreeMap::new();

    for resolved in resolve_entries(tables, window) {
        by_provider
            .entry(resolved.provider.id)
            .or_insert_with(|| (resolved.provider.clone(), Vec::new()))
            .1
            .push(ProviderServiceLine {
                service_date: resolved.entry.service_date,
                received: resolved.entry.entry_datetime_utc,
                member_name: resolved.member.name.clone(),
                member_id: resolved.member.member_id,
                service_id: resolved.service.service_id,
                fee: resolved.service.fee(),
            });
    }

    by_provider
        .into_values()
        .map(|(provider, mut services)| {
            services.sort_by_key(|line| line.received);
            let consultations = u32::try_from(services.len())
                .unwrap_or(u32::MAX)
                .min(CONSULTATION_CAP);
            let total_fee = services.iter().map(|line| line.fee).sum::<Money>().capped(WEEK_FEE_CAP);
            ProviderReport {
                provider,
                services,
                consultations,
                total_fee,
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryLine {
    pub provider_name: String,
    pub provider_id: u32,
    pub consultations: u32,
    pub total_fee: Money,
}

/// Accounts payable for the week.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryReport {
    pub lines: Vec<SummaryLine>,
    pub provider_count: usize,
    pub total_consultations: u32,
    pub overall_fee: Money,
}

/// Totals are sums of the already-capped per-provider figures.
pub fn build_summary_report(provider_reports: &[ProviderReport]) -> SummaryReport {
    let lines: Vec<SummaryLine> = provider_reports
        .iter()
        .map(|report| SummaryLine {
            provider_name: report.provider.name.clone(),
            provider_id: report.provider.id,
            consultations: report.consultations,
            total_fee: report.total_fee,
        })
        .collect();

    SummaryReport {
        provider_count: lines.len(),
        total_consultations: lines.iter().map(|l| l.consultations).sum(),
        overall_fee: lines.iter().map(|l| l.total_fee).sum(),
        lines,
    }
}

/// The provider directory in alphabetical order.
pub fn directory_listing(services: &[Service]) -> Vec<Service> {
    let mut listing = services.to_vec();
    listing.sort_by(|a, b| {
        a.service_name
            .to_lowercase()
            .cmp(&b.service_name.to_lowercase())
            .then(a.service_id.cmp(&b.service_id))
    });
    listing
}
