use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::schema::{self, DataQualityNote, LeafField, Problem};
use crate::types::{
    BillingReport, CompanyDetail, CompanyNode, CountryNode, CountryShape, DetailRow,
    ReportSummary, Totals,
};

/// Where in the report a value was read from. Used only to label notes.
#[derive(Clone, Copy, Default)]
struct Scope<'a> {
    company: Option<&'a str>,
    country: Option<&'a str>,
    tier: Option<&'a str>,
}

impl<'a> Scope<'a> {
    fn company(key: &'a str) -> Self {
        Self {
            company: Some(key),
            ..Self::default()
        }
    }

    fn of_country(country: CountryNode<'a>) -> Self {
        Self {
            company: country.company,
            country: Some(country.code),
            tier: None,
        }
    }

    fn tier(self, key: &'a str) -> Self {
        Self {
            tier: Some(key),
            ..self
        }
    }

    fn note(
        &self,
        field: Option<LeafField>,
        value: Option<&Value>,
        problem: Problem,
    ) -> DataQualityNote {
        DataQualityNote {
            company: self.company.map(str::to_string),
            country: self.country.map(str::to_string),
            rate_tier: self.tier.map(str::to_string),
            field,
            value: value.cloned(),
            problem,
        }
    }
}

/// All four leaf values of one usage record after coercion.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Leaf {
    total_cost: f64,
    delivered: u64,
    failed: u64,
    other: u64,
}

impl Leaf {
    fn totals(&self) -> Totals {
        Totals::new(self.total_cost, self.delivered)
    }
}

fn read_leaf(
    record: &Map<String, Value>,
    scope: Scope<'_>,
    notes: &mut Vec<DataQualityNote>,
) -> Leaf {
    let mut check = |field: LeafField, problem: Option<Problem>| {
        if let Some(problem) = problem {
            notes.push(scope.note(Some(field), record.get(field.key()), problem));
        }
    };

    let cost_field = LeafField::TotalCost;
    let cost = schema::coerce_real(cost_field, record.get(cost_field.key()));
    check(cost_field, cost.problem);

    let mut count = |field: LeafField| {
        let c = schema::coerce_count(field, record.get(field.key()));
        check(field, c.problem);
        c.value
    };

    Leaf {
        total_cost: cost.value,
        delivered: count(LeafField::Delivered),
        failed: count(LeafField::Failed),
        other: count(LeafField::Other),
    }
}

/// Visit every usage record of a country, in key order. `f` receives the
/// tier key (`None` for a flat record) and the coerced leaf.
fn for_each_leaf<'a, F>(country: CountryNode<'a>, notes: &mut Vec<DataQualityNote>, mut f: F)
where
    F: FnMut(Option<&'a str>, &'a Map<String, Value>, Leaf),
{
    let scope = Scope::of_country(country);
    match country.shape() {
        CountryShape::Flat(record) => {
            let leaf = read_leaf(record, scope, notes);
            f(None, record, leaf);
        }
        CountryShape::Tiered(tiers) => {
            for (tier_key, value) in tiers {
                let scope = scope.tier(tier_key);
                match value.as_object() {
                    Some(record) => {
                        let leaf = read_leaf(record, scope, notes);
                        f(Some(tier_key.as_str()), record, leaf);
                    }
                    None => notes.push(scope.note(None, Some(value), Problem::NotAMapping)),
                }
            }
        }
        CountryShape::Malformed(value) => {
            notes.push(scope.note(None, Some(value), Problem::NotAMapping));
        }
    }
}

fn country_totals(country: CountryNode<'_>, notes: &mut Vec<DataQualityNote>) -> Totals {
    let mut totals = Totals::default();
    for_each_leaf(country, notes, |_, _, leaf| totals += leaf.totals());
    totals
}

/// Countries of a company, or a `NotAMapping` note if it has none.
fn countries_of<'a>(
    company: CompanyNode<'a>,
    notes: &mut Vec<DataQualityNote>,
) -> Vec<CountryNode<'a>> {
    match company.countries() {
        Some(countries) => countries.collect(),
        None => {
            let scope = Scope::company(company.key);
            notes.push(scope.note(None, Some(company.raw()), Problem::NotAMapping));
            Vec::new()
        }
    }
}

fn company_totals(company: CompanyNode<'_>, notes: &mut Vec<DataQualityNote>) -> Totals {
    countries_of(company, notes)
        .into_iter()
        .map(|country| country_totals(country, notes))
        .sum()
}

fn log_notes(notes: &[DataQualityNote]) {
    for note in notes {
        log::warn!("data quality: {note}");
    }
}

/// Totals for one country, in either the flat or the tiered layout.
/// Malformed leaf values contribute 0 and are logged.
pub fn aggregate_country(country: CountryNode<'_>) -> Totals {
    let mut notes = Vec::new();
    let totals = country_totals(country, &mut notes);
    log_notes(&notes);
    totals
}

/// Sum of [`aggregate_country`] over every country of the company.
pub fn aggregate_company(company: CompanyNode<'_>) -> Totals {
    let mut notes = Vec::new();
    let totals = company_totals(company, &mut notes);
    log_notes(&notes);
    totals
}

/// Grand totals and the per-company breakdown for a whole report,
/// with every data-quality note found along the way.
pub fn aggregate_report(report: &BillingReport) -> ReportSummary {
    let mut notes = Vec::new();
    let per_company: BTreeMap<String, Totals> = report
        .companies()
        .map(|company| (company.key.to_string(), company_totals(company, &mut notes)))
        .collect();
    let grand_totals = per_company.values().copied().sum();

    log_notes(&notes);
    ReportSummary {
        grand_totals,
        per_company,
        notes,
    }
}

fn push_rows(
    country: CountryNode<'_>,
    rows: &mut Vec<DetailRow>,
    notes: &mut Vec<DataQualityNote>,
) {
    for_each_leaf(country, notes, |tier, record, leaf| {
        let rate_tier_key = match tier {
            Some(key) => Some(key.to_string()),
            None => schema::tier_label(record),
        };
        rows.push(DetailRow {
            country_code: country.code.to_string(),
            rate_tier_key,
            total_cost: leaf.total_cost,
            delivered: leaf.delivered,
            failed: leaf.failed,
            other: leaf.other,
        });
    });
}

/// Flattened detail rows for one country: one row per rate tier, or a
/// single row for a flat record.
pub fn detail_rows(country: CountryNode<'_>) -> Vec<DetailRow> {
    let mut rows = Vec::new();
    let mut notes = Vec::new();
    push_rows(country, &mut rows, &mut notes);
    log_notes(&notes);
    rows
}

/// Detail rows for every country of a company, countries in key order.
///
/// Notes are returned rather than logged: they are the same ones
/// [`aggregate_report`] already reported for this company.
pub fn company_detail_rows(company: CompanyNode<'_>) -> CompanyDetail {
    let mut detail = CompanyDetail::default();
    for country in countries_of(company, &mut detail.notes) {
        push_rows(country, &mut detail.rows, &mut detail.notes);
    }
    detail
}
