//! Static keyword rule set for expense categorization.
//!
//! Triggers are case-insensitive regexes matched against the transaction
//! description. Evaluation order is the declaration order of `TRIGGERS`:
//! the first category with a matching trigger wins, so a description that
//! matches several categories (e.g. "UBER EATS" under both Food & Dining
//! and Transport) resolves to the earliest one in the table. Reorder the
//! table to change priority; nothing else is consulted.

use regex::{Regex, RegexBuilder};

use crate::models::Category;

// (category, trigger patterns) in priority order.
const TRIGGERS: &[(Category, &[&str])] = &[
    (
        Category::HousingBills,
        &[
            r"alquiler", r"rent", r"hipoteca", r"mortgage", r"agua", r"water",
            r"luz", r"electric", r"gas", r"internet", r"telefono", r"phone",
            r"seguro.*hogar", r"home.*insurance", r"comunidad", r"impuesto",
            r"ibi", r"basura", r"garbage", r"utilities",
        ],
    ),
    (
        Category::Groceries,
        &[
            r"mercadona", r"carrefour", r"lidl", r"aldi", r"dia", r"eroski",
            r"alcampo", r"hipercor", r"supermercado", r"supermarket", r"grocery",
            r"alimentacion", r"frutas", r"verduras", r"primaprix", r"consum",
            r"bonarea", r"condis", r"ahorramas", r"simply",
        ],
    ),
    (
        Category::FoodDining,
        &[
            r"restaurante", r"restaurant", r"bar ", r"cafe", r"cafeteria",
            r"mcdonalds", r"burger", r"pizza", r"kebab", r"sushi", r"wok",
            r"just.*eat", r"glovo", r"uber.*eats", r"deliveroo", r"takeaway",
            r"comida", r"cena", r"almuerzo", r"desayuno", r"tapas",
        ],
    ),
    (
        Category::Subscriptions,
        &[
            r"netflix", r"spotify", r"hbo", r"disney", r"amazon.*prime",
            r"youtube.*premium", r"apple.*music", r"icloud", r"google.*one",
            r"dropbox", r"notion", r"canva", r"adobe", r"microsoft.*365",
            r"gym", r"gimnasio", r"suscripcion", r"subscription",
        ],
    ),
    (
        Category::Transport,
        &[
            r"gasolina", r"fuel", r"repsol", r"cepsa", r"bp ", r"shell",
            r"parking", r"aparcamiento", r"metro", r"bus ", r"autobus",
            r"renfe", r"tren", r"train", r"taxi", r"uber", r"cabify", r"bolt",
            r"blablacar", r"peaje", r"toll", r"itv", r"taller", r"mecanico",
        ],
    ),
    (
        Category::Leisure,
        &[
            r"cine", r"cinema", r"teatro", r"theater", r"concierto", r"concert",
            r"museo", r"museum", r"parque.*atracciones", r"zoo", r"aquarium",
            r"escape.*room", r"bolos", r"bowling", r"karaoke", r"discoteca",
            r"club", r"fiesta", r"party", r"viaje", r"travel", r"hotel",
            r"airbnb", r"booking", r"vuelo", r"flight", r"ryanair", r"vueling",
        ],
    ),
    (
        Category::Shopping,
        &[
            r"zara", r"hm", r"h&m", r"mango", r"primark", r"pull.*bear",
            r"bershka", r"stradivarius", r"massimo.*dutti", r"uniqlo",
            r"decathlon", r"mediamarkt", r"fnac", r"el.*corte.*ingles",
            r"amazon", r"aliexpress", r"ikea", r"leroy.*merlin", r"tienda",
            r"store", r"compra", r"purchase", r"ropa", r"clothes",
        ],
    ),
    (
        Category::Health,
        &[
            r"farmacia", r"pharmacy", r"medico", r"doctor", r"hospital",
            r"clinica", r"clinic", r"dentista", r"dentist", r"optica",
            r"fisio", r"physio", r"psicologo", r"therapy", r"spa",
            r"peluqueria", r"hairdresser", r"estetica", r"beauty",
        ],
    ),
    (
        Category::Financial,
        &[
            r"transferencia", r"transfer", r"comision", r"commission", r"fee",
            r"interes", r"interest", r"prestamo", r"loan", r"credito", r"credit",
            r"inversion", r"investment", r"ahorro", r"savings", r"bizum",
            r"paypal", r"revolut", r"n26", r"wise",
        ],
    ),
];

pub struct RuleSet {
    rules: Vec<(Category, Vec<Regex>)>,
}

impl RuleSet {
    /// Compile the built-in trigger table. Patterns are static and covered
    /// by tests, so compilation cannot fail at runtime.
    pub fn new() -> Self {
        let rules = TRIGGERS
            .iter()
            .map(|(category, patterns)| {
                let compiled = patterns
                    .iter()
                    .map(|p| {
                        RegexBuilder::new(p)
                            .case_insensitive(true)
                            .build()
                            .unwrap_or_else(|e| panic!("bad trigger pattern {p:?}: {e}"))
                    })
                    .collect();
                (*category, compiled)
            })
            .collect();
        Self { rules }
    }

    /// First category whose trigger list matches, in table order.
    pub fn classify(&self, description: &str) -> Option<Category> {
        for (category, patterns) in &self.rules {
            if patterns.iter().any(|re| re.is_match(description)) {
                return Some(*category);
            }
        }
        None
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::new()
    }
}
