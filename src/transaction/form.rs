//! The form fields shared by the transaction create and edit pages.

use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;
use time::Date;

use crate::{
    Error,
    account::{Account, AccountId, get_all_accounts},
    card::{Card, CardId, get_all_cards},
    category::{Category, get_categories_by_kind},
    forms::empty_as_none,
    html::{
        FORM_LABEL_STYLE, FORM_RADIO_GROUP_STYLE, FORM_RADIO_INPUT_STYLE, FORM_RADIO_LABEL_STYLE,
        FORM_SELECT_STYLE, FORM_TEXT_INPUT_STYLE, date_attr,
    },
    member::{Member, MemberId, get_all_members},
    transaction::{
        Installments, Transaction, TransactionBuilder, TransactionKind, TransactionStatus,
    },
};

/// The data submitted through the transaction create and edit forms.
#[derive(Debug, Clone, Deserialize)]
pub struct TransactionFormData {
    pub amount: f64,
    pub date: Date,
    pub description: String,
    pub kind: TransactionKind,
    #[serde(default)]
    pub category: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub member_id: Option<MemberId>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub account_id: Option<AccountId>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub card_id: Option<CardId>,
    pub status: TransactionStatus,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub installment_current: Option<u32>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub installment_total: Option<u32>,
}

impl TransactionFormData {
    /// The default values for the create form.
    pub fn new_for(date: Date) -> Self {
        Self {
            amount: 0.0,
            date,
            description: String::new(),
            kind: TransactionKind::Expense,
            category: String::new(),
            member_id: None,
            account_id: None,
            card_id: None,
            status: TransactionStatus::Completed,
            installment_current: None,
            installment_total: None,
        }
    }

    /// The values of an existing transaction, for the edit form.
    pub fn from_transaction(transaction: &Transaction) -> Self {
        let is_split = transaction.installments.is_split();

        Self {
            amount: transaction.amount,
            date: transaction.date,
            description: transaction.description.clone(),
            kind: transaction.kind,
            category: transaction.category.clone(),
            member_id: transaction.member_id,
            account_id: transaction.account_id,
            card_id: transaction.card_id,
            status: transaction.status,
            installment_current: is_split.then(|| transaction.installments.current()),
            installment_total: is_split.then(|| transaction.installments.total()),
        }
    }

    /// Convert the submitted values into a transaction builder.
    ///
    /// A missing installment field defaults to one, so entering only "of 12"
    /// records the first installment of twelve.
    ///
    /// # Errors
    /// Returns [Error::InvalidInstallments] if the installment numbers do not
    /// form a valid combination.
    pub fn builder(&self) -> Result<TransactionBuilder, Error> {
        let installments = match (self.installment_current, self.installment_total) {
            (None, None) => Installments::NONE,
            (current, total) => Installments::new(current.unwrap_or(1), total.unwrap_or(1))?,
        };

        Ok(TransactionBuilder {
            category: self.category.trim().to_string(),
            status: self.status,
            member_id: self.member_id,
            account_id: self.account_id,
            card_id: self.card_id,
            installments,
            ..TransactionBuilder::new(
                self.amount,
                self.date,
                self.description.trim(),
                self.kind,
            )
        })
    }
}

/// The select-box options for the transaction form.
///
/// Loaded in one place so the create page, the edit page, and their error
/// re-renders stay in sync.
#[derive(Debug, Clone)]
pub struct FormSelects {
    pub members: Vec<Member>,
    pub accounts: Vec<Account>,
    pub cards: Vec<Card>,
    pub expense_categories: Vec<Category>,
    pub income_categories: Vec<Category>,
}

impl FormSelects {
    /// Load the options from the database.
    ///
    /// # Errors
    /// Returns [Error::SqlError] if an SQL related error occurred.
    pub fn load(connection: &Connection) -> Result<Self, Error> {
        Ok(Self {
            members: get_all_members(connection)?,
            accounts: get_all_accounts(connection)?,
            cards: get_all_cards(connection)?,
            expense_categories: get_categories_by_kind(TransactionKind::Expense, connection)?,
            income_categories: get_categories_by_kind(TransactionKind::Income, connection)?,
        })
    }
}

pub fn transaction_form_fields(form: &TransactionFormData, selects: &FormSelects) -> Markup {
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
                        id="transaction-kind-expense"
                        type="radio"
                        name="kind"
                        value="expense"
                        checked[form.kind == TransactionKind::Expense]
                        required
                        class=(FORM_RADIO_INPUT_STYLE);

                    label
                        for="transaction-kind-expense"
                        class=(FORM_RADIO_LABEL_STYLE)
                    {
                        "Expense"
                    }
                }

                div class="flex items-center gap-3"
                {
                    input
                        id="transaction-kind-income"
                        type="radio"
                        name="kind"
                        value="income"
                        checked[form.kind == TransactionKind::Income]
                        required
                        class=(FORM_RADIO_INPUT_STYLE);

                    label
                        for="transaction-kind-income"
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
            label for="date" class=(FORM_LABEL_STYLE) { "Date" }

            input
                id="date"
                type="date"
                name="date"
                value=(date_attr(form.date))
                required
                class=(FORM_TEXT_INPUT_STYLE);
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

                // A name kept by a transaction after its category was
                // deleted still needs an option, or the browser would
                // silently drop it on save.
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
            label for="card_id" class=(FORM_LABEL_STYLE) { "Card" }

            select id="card_id" name="card_id" class=(FORM_SELECT_STYLE)
            {
                option value="" { "No card" }

                @for card in &selects.cards {
                    option value=(card.id) selected[form.card_id == Some(card.id)] {
                        (card.name) " ···" (card.last_four)
                    }
                }
            }
        }

        div
        {
            label for="status" class=(FORM_LABEL_STYLE) { "Status" }

            select id="status" name="status" class=(FORM_SELECT_STYLE)
            {
                option value="completed" selected[form.status == TransactionStatus::Completed] {
                    "Completed"
                }
                option value="pending" selected[form.status == TransactionStatus::Pending] {
                    "Pending"
                }
            }
        }

        div
        {
            label for="installment_current" class=(FORM_LABEL_STYLE) {
                "Installment (optional)"
            }

            div class="flex items-center gap-2"
            {
                input
                    id="installment_current"
                    type="number"
                    name="installment_current"
                    min="1"
                    placeholder="1"
                    value=[form.installment_current]
                    class=(FORM_TEXT_INPUT_STYLE);

                span class=(FORM_RADIO_LABEL_STYLE) { "of" }

                input
                    id="installment_total"
                    type="number"
                    name="installment_total"
                    min="1"
                    placeholder="1"
                    value=[form.installment_total]
                    class=(FORM_TEXT_INPUT_STYLE);
            }
        }
    }
}

fn category_option_label(category: &Category) -> String {
    match &category.icon {
        Some(icon) => format!("{icon} {}", category.name),
        None => category.name.to_string(),
    }
}
