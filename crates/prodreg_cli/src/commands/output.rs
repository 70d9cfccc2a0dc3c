//! Result rendering.

use crate::OutputFormat;
use prodreg_core::{Product, Response};

/// Prints a response in the requested format.
pub fn print(response: &Response, format: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        OutputFormat::Json => {
            if !matches!(response, Response::Empty) {
                println!("{}", serde_json::to_string_pretty(response)?);
            }
        }
        OutputFormat::Text => print!("{}", render_text(response)),
    }
    Ok(())
}

fn render_text(response: &Response) -> String {
    match response {
        Response::Empty => "OK\n".to_owned(),
        Response::Exists(found) => format!("{found}\n"),
        Response::Product(product) => render_product(product),
        Response::Products(products) if products.is_empty() => "No products.\n".to_owned(),
        Response::Products(products) => {
            let mut out = String::new();
            for product in products {
                out.push_str(&format!(
                    "{:<12} {:<20} {:<14} {}\n",
                    product.id, product.name, product.status, product.owner
                ));
            }
            out.push_str(&format!("\n{} product(s)\n", products.len()));
            out
        }
    }
}

fn render_product(product: &Product) -> String {
    format!(
        "Product {}\n\
         ========\n\
         \x20 Name:        {}\n\
         \x20 Status:      {}\n\
         \x20 Owner:       {}\n\
         \x20 Category:    {}\n\
         \x20 Description: {}\n\
         \x20 Created:     {}\n\
         \x20 Updated:     {}\n",
        product.id,
        product.name,
        product.status,
        product.owner,
        product.category,
        product.description,
        product.created_at,
        product.updated_at,
    )
}
