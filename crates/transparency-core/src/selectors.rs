//! Fixed locators and markers of the portal's page structure.

use crate::driver::Locator;

/// Title of the anti-automation interstitial.
pub const CHALLENGE_PAGE_TITLE: &str = "Human Verification";

// Landing page
pub const ACCEPT_ALL_COOKIES_BTN: Locator = Locator::XPath(r#"//*[@id="accept-all-btn"]"#);
pub const TUTORIAL_CLOSE_BTN: Locator = Locator::XPath(
    r#"//button[contains(@class, "botao-tutorial") and contains(text(), "Pular tutorial")]"#,
);

// Navigation
pub const PEOPLE_SEARCH_SERVICE_BTN: Locator = Locator::XPath(
    r#"//h5[contains(@class, "pl-3") and contains(@class, "pr-3") and text()="Pessoas Físicas e Jurídicas"]"#,
);
pub const NATURAL_PERSON_SEARCH_BTN: Locator = Locator::XPath(
    r#"//div[@id="main-content"]//button[@onclick="location.href='/pessoa-fisica/busca/lista';"]"#,
);

// Search form
pub const SEARCH_INPUT: Locator = Locator::XPath(r#"//*[@id="termo"]"#);
pub const SEARCH_BTN: Locator = Locator::XPath(
    r#"//form[@id="form-superior"]//button[contains(@class, "br-button") and @type="submit"]"#,
);

// Filters
pub const FILTER_PANEL_TOGGLE: Locator = Locator::XPath(
    r#"//div[@id="accordion1"]//button[contains(@aria-controls, "busca-refinada")]"#,
);
pub const VISIBLE_FILTER_PANEL_TOGGLE: Locator = Locator::XPath(
    r#"//div[contains(@class, "item") and contains(@class, "bordered")]//button[contains(@class, "header") and @aria-controls="box-busca-refinada"][span[contains(@class, "title") and text()="Refine a Busca"]]"#,
);
pub const SOCIAL_PROGRAMS_FILTER: Locator = Locator::XPath(
    r#"//div[@id="box-busca-refinada"]//label[@for="beneficiarioProgramaSocial"]"#,
);

// Search results
pub const RESULT_NAMES: Locator = Locator::XPath(r#"//a[contains(@class, "link-busca-nome")]"#);
pub const RESULT_IDENTIFIERS: Locator = Locator::XPath(r#"//div[contains(@class, "mt-3")]/strong"#);
pub const RESULT_COUNT: Locator = Locator::XPath(
    r#"//*[@class="br-list"]//p[contains(., "Foram encontrados")]/strong[@id="countResultados"]"#,
);

// Person page
pub const PERSON_LOCATION: Locator = Locator::XPath(
    r#"//section[@class="dados-tabelados"]//div[@class="col-xs-12 col-sm-3"][.//strong[contains(text(), "Localidade")]]/span"#,
);
pub const PERSON_IDENTIFIER: Locator = Locator::XPath(
    r#"//section[@class="dados-tabelados"]//div[contains(@class, "col-xs-12") and contains(.//strong, "CPF")]//span"#,
);
pub const FINANCIAL_RESOURCES_SECTION: Locator = Locator::XPath(
    r#"//span[contains(@class, "title") and contains(text(), "Recebimentos de recursos")]"#,
);
pub const MAIN_CONTENT: Locator = Locator::XPath(r#"//*[@id="main"]"#);

// Tables
pub const RESOURCE_TABLES: Locator = Locator::Css("div.br-table");
pub const DETAIL_TABLE: Locator = Locator::Css("table.dataTable");
pub const DETAIL_NEXT_PAGE_BTN: Locator =
    Locator::XPath(r#"//*[@id="tabelaDetalheValoresRecebidos_next"]/button"#);
