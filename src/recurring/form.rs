//! The form fields shared by the recurring template create and edit pages.

use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;
use time::Date;

use crate::{
    Error,
    account::{Account, AccountId, get_all_accounts},
    card::DayOfMonth,
    category::{Category, get_categories_by_kind},
    forms::{empty_as_none, empty_date_as_none},
    html::{
        FORM_LABEL_STYLE, FORM_RADIO_GROUP_STYLE, FORM_RADIO_INPUT_STYLE, FORM_RADIO_LABEL_STYLE,
        FORM_SELECT_STYLE, FORM_TEXT_INPUT_STYLE, date_attr,
    },
    member::{Member, MemberId, get_all_members},
    recurring::{Frequency, RecurringTemplate, TemplateBuilder, domain::weekday_from_iso},
    transaction::TransactionKind,
};

const WEEKDAY_OPTIONS: [(u8, &str); 7] = [
    (1, "Monday"),
    (2, "Tuesday"),
    (3, "Wednesday"),
    (4, "Thursday"),
    (5, "Friday"),
    (6, "Saturday"),
    (7, "Sunday"),
];

/// The data submitted through the recurring template create and edit forms.
#[derive(Debug, Clone, Deserialize)]
pub struct TemplateFormData {
    pub amount: f64,
    #[serde(default)]
    pub description: String,
    pub kind: TransactionKind,
    #[serde(default)]
    pub category: String,
    pub frequency: Frequency,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub day_of_week: Option<u8>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub day_of_month: Option<u8>,
    pub start_date: Date,
    #[serde(default, deserialize_with = "empty_date_as_none")]
    pub end_date: Option<Date>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub account_id: Option<AccountId>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub member_id: Option<MemberId>,
    #[serde(default)]
    pub active: bool,
}

impl TemplateFormData {
    /// The default values for the create form.
    pub fn new_for(start_date: Date) -> Self {
        Self {
            amount: 0.0,
            description: String::new(),
            kind: TransactionKind::Expense,
            category: String::new(),
            frequency: Frequency::Monthly,
            day_of_week: None,
            day_of_month: Some(1),
            start_date,
            end_date: None,
            account_id: None,
            member_id: None,
            active: true,
        }
    }

    /// The values of an existing template, for the edit form.
    pub fn from_template(template: &RecurringTemplate) -> Self {
        Self {
            amount: template.amount,
            description: template.description.clone(),
            kind: template.kind,
            category: template.category.clone(),
            frequency: template.frequency,
            day_of_week: template
                .day_of_week
                .map(|weekday| weekday.number_from_monday()),
            day_of_month: template.day_of_month.map(DayOfMonth::get),
            start_date: template.start_date,
            end_date: template.end_date,
            account_id: template.account_id,
            member_id: template.member_id,
            active: template.active,
        }
    }

    /// Convert the submitted values into a template builder.
    ///
    /// # Errors
    /// Returns [Error::InvalidDayOfMonth] if the monthly anchor day is
    /// outside 1 to 31.
    pub fn builder(&self) -> Result<TemplateBuilder, Error> {
        let day_of_month = match self.day_of_month {
            Some(day) => Some(DayOfMonth::new(day)?),
            None => None,
        };

        Ok(TemplateBuilder {
            category: self.category.trim().to_string(),
            day_of_week: self.day_of_week.and_then(weekday_from_iso),
            day_of_month,
            end_date: self.end_date,
            account_id: self.account_id,
            member_id: self.member_id,
            active: self.active,
            ..TemplateBuilder::new(
                self.amount,
                self.start_date,
                self.description.trim(),
                self.kind,
                self.frequency,
            )
        })
    }
}

/// The select-box options for the recurring template form.
#[derive(Debug, Clone)]
pub struct TemplateSelects {
    pub members: Vec<Member>,
    pub accounts: Vec<Account>,
    pub expense_categories: Vec<Category>,
    pub income_categories: Vec<Category>,
}

impl TemplateSelects {
    /// Load the options from the database.
    ///
    /// # Errors
    /// Returns [Error::SqlError] if an SQL related error occurred.
    pub fn load(connection: &Connection) -> Result<Self, Error> {
        Ok(Self {
            members: get_all_members(connection)?,
            accounts: get_all_accounts(connection)?,
            expense_categories: get_categories_by_kind(TransactionKind::Expense, connection)?,
            income_categories: get_categories_by_kind(TransactionKind::Income, connection)?,
        })
    }
}

pub fn template_form_fields(form: &TemplateFormData, selects: &TemplateSelects) -> Markup {
    let amount_value = (form.amount != 0.0).then(|| format!("{:.2}", form.amount.abs()));
    let category_is_stored = selects
        .expense_categories
        .iter()
        .chain(&selects.income_categories)
        .any(|category| category.name.as_ref() == form.category);

    html! {
        fieldset class="space-y-2"
        {
            legend class=(FORM_LABEL_STYLE) { "Kind" }

            div class=(FORM_RADIO_GROUP_STYLE)
            {
                div class="flex items-center gap-3"
                {
                    input
                        id="recurring-kind-expense"
                        type="radio"
                        name="kind"
                        value="expense"
                        checked[form.kind == TransactionKind::Expense]
                        required
                        class=(FORM_RADIO_INPUT_STYLE);

                    label
                        for="recurring-kind-expense"
                        class=(FORM_RADIO_LABEL_STYLE)
                    {
                        "Expense"
                    }
                }

                div class="flex items-center gap-3"
                {
                    input
                        id="recurring-kind-income"
                        type="radio"
                        name="kind"
                        value="income"
                        checked[form.kind == TransactionKind::Income]
                        required
                        class=(FORM_RADIO_INPUT_STYLE);

                    label
                        for="recurring-kind-income"
                        class=(FORM_RADIO_LABEL_STYLE)
                    {
                        "Income"
                    }
                }
            }
        }

        div
        {
            label for="amount" class=(FORM_LABEL_STYLE) { "Amount" }

            div class="input-wrapper w-full"
            {
                input
                    id="amount"
                    type="number"
                    name="amount"
                    step="0.01"
                    min="0"
                    placeholder="0.00"
                    value=[amount_value]
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }
        }

        div
        {
            label for="description" class=(FORM_LABEL_STYLE) { "Description" }

            input
                id="description"
                type="text"
                name="description"
                placeholder="Description"
                value=(form.description)
                class=(FORM_TEXT_INPUT_STYLE);
        }

        div
        {
            label for="category" class=(FORM_LABEL_STYLE) { "Category" }

            select id="category" name="category" class=(FORM_SELECT_STYLE)
            {
                option value="" { "No category" }

                // A name kept by a template after its category was deleted
                // still needs an option, or the browser would silently drop
                // it on save.
                @if !form.category.is_empty() && !category_is_stored {
                    option value=(form.category) selected { (form.category) }
                }

                optgroup label="Expense categories"
                {
                    @for category in &selects.expense_categories {
                        option
                            value=(category.name)
                            selected[category.name.as_ref() == form.category]
                        {
                            (category_option_label(category))
                        }
                    }
                }

                optgroup label="Income categories"
                {
                    @for category in &selects.income_categories {
                        option
                            value=(category.name)
                            selected[category.name.as_ref() == form.category]
                        {
                            (category_option_label(category))
                        }
                    }
                }
            }
        }

        div
        {
            label for="frequency" class=(FORM_LABEL_STYLE) { "Frequency" }

            select id="frequency" name="frequency" class=(FORM_SELECT_STYLE)
            {
                @for frequency in Frequency::ALL {
                    option value=(frequency) selected[form.frequency == frequency] {
                        (frequency.label())
                    }
                }
            }
        }

        div
        {
            label for="day_of_week" class=(FORM_LABEL_STYLE) { "Day of week (weekly)" }

            select id="day_of_week" name="day_of_week" class=(FORM_SELECT_STYLE)
            {
                option value="" { "No day" }

                @for (number, name) in WEEKDAY_OPTIONS {
                    option value=(number) selected[form.day_of_week == Some(number)] {
                        (name)
                    }
                }
            }
        }

        div
        {
            label for="day_of_month" class=(FORM_LABEL_STYLE) { "Day of month (monthly)" }

            input
                id="day_of_month"
                type="number"
                name="day_of_month"
                min="1"
                max="31"
                value=[form.day_of_month]
                class=(FORM_TEXT_INPUT_STYLE);
        }

        div
        {
            label for="start_date" class=(FORM_LABEL_STYLE) { "Start date" }

            input
                id="start_date"
                type="date"
                name="start_date"
                value=(date_attr(form.start_date))
                required
                class=(FORM_TEXT_INPUT_STYLE);
        }

        div
        {
            label for="end_date" class=(FORM_LABEL_STYLE) { "End date (optional)" }

            input
                id="end_date"
                type="date"
                name="end_date"
                value=[form.end_date.map(date_attr)]
                class=(FORM_TEXT_INPUT_STYLE);
        }

        div
        {
            label for="account_id" class=(FORM_LABEL_STYLE) { "Account" }

            select id="account_id" name="account_id" class=(FORM_SELECT_STYLE)
            {
                option value="" { "No account" }

                @for account in &selects.accounts {
                    option value=(account.id) selected[form.account_id == Some(account.id)] {
                        (account.name)
                    }
                }
            }
        }

        div
        {
            label for="member_id" class=(FORM_LABEL_STYLE) { "Member" }

            select id="member_id" name="member_id" class=(FORM_SELECT_STYLE)
            {
                option value="" { "No member" }

                @for member in &selects.members {
                    option value=(member.id) selected[form.member_id == Some(member.id)] {
                        (member.name)
                    }
                }
            }
        }

        div class="flex items-center gap-3"
        {
            input
                id="active"
                type="checkbox"
                name="active"
                value="true"
                checked[form.active]
                class=(FORM_RADIO_INPUT_STYLE);

            label for="active" class=(FORM_RADIO_LABEL_STYLE) { "Active" }
        }
    }
}

fn category_option_label(category: &Category) -> String {
    match &category.icon {
        Some(icon) => format!("{icon} {}", category.name),
        None => category.name.to_string(),
    }
}

#[cfg(test)]
mod template_form_data_tests {
    use time::{Weekday, macros::date};

    use crate::{
        Error,
        recurring::{Frequency, form::TemplateFormData},
        transaction::TransactionKind,
    };

    fn test_form() -> TemplateFormData {
        TemplateFormData {
            description: "  Rent  ".to_string(),
            category: " Housing ".to_string(),
            ..TemplateFormData::new_for(date!(2024 - 01 - 01))
        }
    }

    #[test]
    fn builder_trims_text_fields() {
        let builder = test_form().builder().expect("Could not build template");

        assert_eq!(builder.description, "Rent");
        assert_eq!(builder.category, "Housing");
    }

    #[test]
    fn builder_converts_the_anchor_fields() {
        let form = TemplateFormData {
            frequency: Frequency::Weekly,
            day_of_week: Some(5),
            day_of_month: Some(31),
            ..test_form()
        };

        let builder = form.builder().expect("Could not build template");

        assert_eq!(builder.day_of_week, Some(Weekday::Friday));
        assert_eq!(builder.day_of_month.map(|day| day.get()), Some(31));
    }

    #[test]
    fn builder_rejects_a_day_of_month_out_of_range() {
        let form = TemplateFormData {
            day_of_month: Some(32),
            ..test_form()
        };

        assert_eq!(form.builder(), Err(Error::InvalidDayOfMonth(32)));
    }

    #[test]
    fn default_form_is_an_active_monthly_expense() {
        let form = TemplateFormData::new_for(date!(2024 - 01 - 01));

        assert_eq!(form.kind, TransactionKind::Expense);
        assert_eq!(form.frequency, Frequency::Monthly);
        assert_eq!(form.day_of_month, Some(1));
        assert!(form.active);
    }
}
