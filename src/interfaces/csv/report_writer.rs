use crate::domain::money::Money;
use crate::domain::order::Order;
use crate::domain::product::Product;
use crate::error::Result;
use serde::Serialize;
use std::io::Write;

#[derive(Serialize)]
struct OrderRow<'a> {
    order: &'a str,
    customer: &'a str,
    status: String,
    currency: &'static str,
    lines: usize,
    total: Money,
}

#[derive(Serialize)]
struct StockRow<'a> {
    sku: &'a str,
    name: &'a str,
    price: Money,
    currency: &'static str,
    stock: u32,
    active: bool,
}

/// Writes end-of-run reports as CSV.
pub struct ReportWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> ReportWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    /// One row per order: `order,customer,status,currency,lines,total`.
    pub fn write_orders(&mut self, orders: &[Order]) -> Result<()> {
        for order in orders {
            self.writer.serialize(OrderRow {
                order: &order.external_id,
                customer: &order.customer_ref,
                status: order.status.to_string(),
                currency: order.currency.code(),
                lines: order.items.len(),
                total: order.total_amount,
            })?;
        }
        self.writer.flush()?;
        Ok(())
    }

    /// One row per product: `sku,name,price,currency,stock,active`.
    pub fn write_stock(&mut self, products: &[Product]) -> Result<()> {
        for product in products {
            self.writer.serialize(StockRow {
                sku: &product.sku,
                name: &product.name,
                price: product.unit_price,
                currency: product.currency.code(),
                stock: product.stock_quantity,
                active: product.is_active,
            })?;
        }
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::money::Currency;
    use crate::domain::order::OrderLine;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    #[test]
    fn test_stock_report() {
        let mut off = Product::new("B", "Banana", Money::new(dec!(0.5)), Currency::Usd, 0);
        off.is_active = false;
        let products = vec![
            Product::new("A", "Apple", Money::new(dec!(1.5)), Currency::Eur, 10),
            off,
        ];

        let mut out = Vec::new();
        ReportWriter::new(&mut out).write_stock(&products).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "sku,name,price,currency,stock,active\nA,Apple,1.50,EUR,10,true\nB,Banana,0.50,USD,0,false\n"
        );
    }

    #[test]
    fn test_orders_report() {
        let apple = Product::new("A", "Apple", Money::new(dec!(19.99)), Currency::Eur, 10);
        let order = Order::place(
            "o-1",
            "c-1",
            Currency::Eur,
            vec![OrderLine::snapshot(&apple, 2).unwrap()],
            Utc::now(),
        )
        .unwrap();

        let mut out = Vec::new();
        ReportWriter::new(&mut out).write_orders(&[order]).unwrap();

        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("order,customer,status,currency,lines,total"));
        assert_eq!(lines.next(), Some("o-1,c-1,CREATED,EUR,1,39.98"));
    }

    #[test]
    fn test_empty_report_writes_nothing() {
        let mut out = Vec::new();
        ReportWriter::new(&mut out).write_orders(&[]).unwrap();
        assert!(out.is_empty());
    }
}
