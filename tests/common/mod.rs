#![allow(dead_code)]

use rand::Rng;
use rust_decimal_macros::dec;
use std::fs::File;
use std::io::{Error, Write};
use std::path::Path;
use std::sync::Arc;
use storefront::application::engine::Storefront;
use storefront::config::EngineConfig;
use storefront::domain::customer::Customer;
use storefront::domain::money::{Currency, Money};
use storefront::domain::ports::StoreRef;
use storefront::domain::product::Product;
use storefront::infrastructure::in_memory::InMemoryStore;

/// A storefront over `store` with two EUR products (`X` at 19.99, `Y` at
/// 5.00, ten of each) and customer `cust-1`.
pub async fn seeded_shop_on(store: StoreRef) -> Storefront {
    let shop = Storefront::new(store, EngineConfig::default());
    shop.catalog()
        .import_products(vec![
            Product::new("X", "Thing", Money::new(dec!(19.99)), Currency::Eur, 10),
            Product::new("Y", "Widget", Money::new(dec!(5.00)), Currency::Eur, 10),
        ])
        .await
        .unwrap();
    shop.catalog()
        .import_customers(vec![Customer::new(
            "cust-1",
            "Ada",
            "Lovelace",
            "ada@example.com",
        )])
        .await
        .unwrap();
    shop
}

pub async fn seeded_shop() -> Storefront {
    seeded_shop_on(Arc::new(InMemoryStore::new())).await
}

/// Writes a catalog CSV with `rows` EUR products `P-1..=P-rows`, each with
/// `stock` units.
pub fn generate_catalog(path: &Path, rows: usize, stock: u32) -> Result<(), Error> {
    let file = File::create(path)?;
    let mut wtr = csv::WriterBuilder::new().from_writer(file);

    wtr.write_record(["sku", "name", "price", "currency", "stock"])?;
    for i in 1..=rows {
        wtr.write_record([
            format!("P-{i}"),
            format!("Product {i}"),
            format!("{}.{:02}", i % 50 + 1, i % 100),
            "EUR".to_string(),
            stock.to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

pub fn write_customers(path: &Path, ids: &[&str]) -> Result<(), Error> {
    let mut file = File::create(path)?;
    writeln!(file, "external_id,first_name,last_name,email")?;
    for id in ids {
        writeln!(file, "{id},Test,Customer,{id}@example.com")?;
    }
    Ok(())
}

/// Writes a script that fills `carts` carts with random lines drawn from
/// `P-1..=P-products`, checks each one out for `cust-1` and pays it.
pub fn generate_script(
    path: &Path,
    carts: usize,
    products: usize,
    rng: &mut impl Rng,
) -> Result<(), Error> {
    let mut file = File::create(path)?;
    for c in 0..carts {
        writeln!(file, r#"{{"op": "create_cart", "alias": "c{c}"}}"#)?;
        for _ in 0..rng.gen_range(1..=4) {
            let sku = rng.gen_range(1..=products);
            let quantity = rng.gen_range(1..=3);
            writeln!(
                file,
                r#"{{"op": "add_item", "cart": "c{c}", "sku": "P-{sku}", "quantity": {quantity}}}"#
            )?;
        }
        writeln!(
            file,
            r#"{{"op": "checkout", "cart": "c{c}", "customer": "cust-1", "alias": "o{c}"}}"#
        )?;
        writeln!(file, r#"{{"op": "pay", "order": "o{c}"}}"#)?;
    }
    Ok(())
}
