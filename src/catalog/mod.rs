use std::fmt::Debug;

use rquest::Client;
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, BufReader};
use utils::{chunk_ids, dedupe_ids, dedupe_products, get_client, parse_filter_value};

use crate::prelude::*;

use self::api::*;
use self::types::Product;

pub mod api;
pub mod auth;
pub mod types;
pub mod utils;

pub const PAGE_SIZE: usize = 50;

/// Interactive catalog browser; a filter change invalidates the page
/// set and triggers a refetch.
pub struct Session {
    client: Client,
    fields: Vec<String>,
    filter: Option<(String, Value)>,
    pages: Vec<Vec<String>>,
    page: usize,
}

impl Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "filter={:?}; pages={}; page={}",
            self.filter,
            self.pages.len(),
            self.page
        )
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            client: get_client(),
            fields: Vec::new(),
            filter: None,
            pages: Vec::new(),
            page: 0,
        }
    }

    pub async fn reload(&mut self) {
        let ids = match &self.filter {
            Some((field, value)) => {
                with_retry("filter", || filter_ids(&self.client, field, value)).await
            }
            None => with_retry("get_ids", || get_ids(&self.client, None, None)).await,
        };

        self.pages = chunk_ids(&dedupe_ids(ids), PAGE_SIZE);
        self.page = 0;
    }

    pub async fn apply_filter(&mut self, field: String, value: Value) {
        self.filter = Some((field, value));
        self.reload().await;
    }

    pub async fn clear_filter(&mut self) {
        self.filter = None;
        self.reload().await;
    }

    pub async fn current_items(&self) -> Vec<Product> {
        let ids = match self.pages.get(self.page) {
            Some(ids) => ids,
            None => return Vec::new(),
        };

        let items = with_retry("get_items", || get_items(&self.client, ids)).await;

        dedupe_products(items)
    }

    pub fn next_page(&mut self) -> bool {
        if self.page + 1 < self.pages.len() {
            self.page += 1;
            true
        } else {
            false
        }
    }

    pub fn prev_page(&mut self) -> bool {
        if self.page > 0 {
            self.page -= 1;
            true
        } else {
            false
        }
    }

    // 1-based; out-of-range input leaves the cursor where it was
    pub fn goto_page(&mut self, number: usize) -> bool {
        if number >= 1 && number <= self.pages.len() {
            self.page = number - 1;
            true
        } else {
            false
        }
    }

    async fn render_page(&self) {
        let items = self.current_items().await;
        if items.is_empty() {
            println!("no items found");
            return;
        }

        for item in &items {
            println!(
                "{:<14} {:>12.2}  {:<16} {}",
                item.id,
                item.price,
                item.brand.as_deref().unwrap_or("-"),
                item.name
            );
        }

        println!(
            "page {}/{} ({} items)",
            self.page + 1,
            self.pages.len(),
            items.len()
        );
    }

    #[tracing::instrument]
    pub async fn run(&mut self) -> Result<()> {
        info!("Loading catalog fields...");
        self.fields = with_retry("get_fields", || get_fields(&self.client)).await;

        info!("Loading catalog ids...");
        self.reload().await;
        self.render_page().await;

        print_help();

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            let line = match lines.next_line().await? {
                Some(line) => line,
                None => break,
            };

            let parts: Vec<&str> = line.split_whitespace().collect();
            match parts.as_slice() {
                [] => {}
                ["quit"] | ["q"] => break,
                ["help"] | ["h"] => print_help(),
                ["fields"] => {
                    if self.fields.is_empty() {
                        self.fields = with_retry("get_fields", || get_fields(&self.client)).await;
                    }

                    if self.fields.is_empty() {
                        println!("no fields found");
                    } else {
                        println!("fields: {}", self.fields.join(", "));
                    }
                }
                ["filter", field, value @ ..] if !value.is_empty() => {
                    let known_field =
                        self.fields.is_empty() || self.fields.iter().any(|known| known == field);
                    if !known_field {
                        println!("unknown field {}; known: {}", field, self.fields.join(", "));
                        continue;
                    }

                    let value = parse_filter_value(&value.join(" "));
                    self.apply_filter(field.to_string(), value).await;
                    self.render_page().await;
                }
                ["clear"] => {
                    self.clear_filter().await;
                    self.render_page().await;
                }
                ["next"] | ["n"] => {
                    if self.next_page() {
                        self.render_page().await;
                    } else {
                        println!("already on the last page");
                    }
                }
                ["prev"] | ["p"] => {
                    if self.prev_page() {
                        self.render_page().await;
                    } else {
                        println!("already on the first page");
                    }
                }
                ["page", number] => {
                    let number = match number.parse::<usize>() {
                        Ok(number) => number,
                        Err(_) => {
                            println!("page takes a number");
                            continue;
                        }
                    };

                    if self.goto_page(number) {
                        self.render_page().await;
                    } else {
                        println!("no page {}; have {}", number, self.pages.len());
                    }
                }
                ["reload"] => {
                    self.reload().await;
                    self.render_page().await;
                }
                _ => println!("unknown command; type `help`"),
            }
        }

        Ok(())
    }
}

fn print_help() {
    println!(
        "commands: fields | filter <field> <value> | clear | next | prev | page <n> | reload | help | quit"
    );
}

/// One saved query: filter the catalog, walk the id pages, write every
/// matching product to `<name>.csv`.
pub struct ExportTask {
    pub name: String,
    pub field: String,
    pub value: Value,
    client: Client,
}

impl Debug for ExportTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "name={}; field={}; value={}",
            self.name, self.field, self.value
        )
    }
}

impl ExportTask {
    pub fn new(name: String, field: String, value: Value) -> Self {
        Self {
            name,
            field,
            value,
            client: get_client(),
        }
    }

    #[tracing::instrument]
    pub async fn run(self) -> Result<()> {
        info!("Filtering catalog...");
        let ids = dedupe_ids(
            with_retry("filter", || {
                filter_ids(&self.client, &self.field, &self.value)
            })
            .await,
        );

        if ids.is_empty() {
            info!("No items found; nothing to export");
            return Ok(());
        }

        let out_path = format!("{}.csv", self.name);
        let mut writer = csv::Writer::from_path(&out_path)
            .map_err(|error| anyhow!("could not write csv file {}", error))?;

        let mut exported = 0;
        for page in chunk_ids(&ids, PAGE_SIZE) {
            let items = dedupe_products(
                with_retry("get_items", || get_items(&self.client, &page)).await,
            );

            for item in items {
                writer
                    .serialize(item)
                    .map_err(|error| anyhow!("could not serialize csv record: {}", error))?;
                exported += 1;
            }
        }

        writer
            .flush()
            .map_err(|error| anyhow!("could not flush csv file {}", error))?;

        info!("Export finished; count={}; path={}", exported, out_path);

        Ok(())
    }
}
