//! The form for filtering the dashboard's entry list.
//!
//! The form is a plain GET form, so the filters live in the query string and
//! a filtered dashboard can be bookmarked.

use maud::{Markup, html};

use crate::{
    endpoints,
    filter::{ALL_OPTION, FilterParams},
    html::{BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, LINK_STYLE},
    taxonomy::{Category, TransactionType},
};

/// The type and category names offered by the filter dropdowns.
pub(super) struct FilterOptions<'a> {
    pub types: &'a [TransactionType],
    pub expense_categories: &'a [Category],
    pub income_categories: &'a [Category],
}

impl FilterOptions<'_> {
    fn categories(&self) -> impl Iterator<Item = &Category> {
        self.expense_categories
            .iter()
            .chain(self.income_categories.iter())
    }
}

fn name_options<'a>(
    names: impl Iterator<Item = &'a str>,
    selected: Option<&str>,
    placeholder: (&str, &str),
) -> Markup {
    let (placeholder_value, placeholder_text) = placeholder;

    html! {
        option value=(placeholder_value) { (placeholder_text) }

        @for name in names {
            option value=(name) selected[Some(name) == selected] { (name) }
        }
    }
}

fn text_input(id: &str, label: &str, value: Option<&str>, placeholder: &str) -> Markup {
    html! {
        div
        {
            label for=(id) class=(FORM_LABEL_STYLE) { (label) }

            input
                type="text"
                name=(id)
                id=(id)
                value=[value]
                placeholder=(placeholder)
                class=(FORM_TEXT_INPUT_STYLE);
        }
    }
}

fn select(id: &str, label: &str, options: Markup) -> Markup {
    html! {
        div
        {
            label for=(id) class=(FORM_LABEL_STYLE) { (label) }

            select name=(id) id=(id) class=(FORM_TEXT_INPUT_STYLE)
            {
                (options)
            }
        }
    }
}

/// Renders the filter form pre-filled with `params`.
pub(super) fn filter_form(params: &FilterParams, options: &FilterOptions) -> Markup {
    let type_names = || {
        options
            .types
            .iter()
            .map(|transaction_type| transaction_type.name.as_str())
    };
    let category_names = || options.categories().map(|category| category.name.as_str());
    let any = ("", "Any");
    let all = (ALL_OPTION, ALL_OPTION);

    html! {
        section class="w-full mb-8"
        {
            h3 class="text-xl font-semibold mb-4" { "Filter Entries" }

            form
                id="filter-form"
                method="get"
                action=(endpoints::DASHBOARD_VIEW)
                class="bg-gray-50 dark:bg-gray-800 p-4 rounded-lg space-y-4"
            {
                div class="grid grid-cols-1 md:grid-cols-3 gap-4"
                {
                    (select("type", "Type", name_options(type_names(), params.type_name(), any)))
                    (text_input(
                        "category-search",
                        "Category contains",
                        params.category_search(),
                        "e.g. food",
                    ))
                    (select(
                        "category",
                        "Category",
                        name_options(category_names(), params.category(), any),
                    ))
                }

                fieldset class="grid grid-cols-1 md:grid-cols-3 gap-4"
                {
                    legend class="mb-2 text-sm font-semibold" { "Date range" }

                    (select(
                        "type-advanced",
                        "Type",
                        name_options(type_names(), params.type_advanced(), all),
                    ))
                    (select(
                        "category-advanced",
                        "Category",
                        name_options(category_names(), params.category_advanced(), all),
                    ))
                    (text_input("date", "Dates", params.date(), "MM/DD/YYYY - MM/DD/YYYY"))
                }

                (text_input("search", "Search", params.search(), "A type, category, note word or name"))

                div class="flex items-center gap-4"
                {
                    button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Apply" }

                    @if params.is_active() {
                        a href=(endpoints::DASHBOARD_VIEW) class={ (LINK_STYLE) " whitespace-nowrap" }
                        {
                            "Clear filters"
                        }
                    }
                }
            }
        }
    }
}
