/// Shopping-list rendering
///
/// Pure, deterministic formatting of the aggregated shopping cart into the
/// plain-text document served as `cart.txt`. No database or network access
/// happens here; identical inputs always produce byte-identical output, so
/// the layout is pinned by golden tests.

use foodgram_shared::models::relation::CartIngredient;

/// Renders the downloadable shopping list
///
/// Lists the source recipe names first, then one line per aggregated
/// ingredient in the order the aggregation query produced them.
pub fn render(recipe_names: &[String], items: &[CartIngredient]) -> String {
    let mut out = String::from("Shopping list\n");

    out.push_str("\nRecipes:\n");
    for name in recipe_names {
        out.push_str("- ");
        out.push_str(name);
        out.push('\n');
    }

    out.push_str("\nIngredients:\n");
    for item in items {
        out.push_str(&format!(
            "- {} ({}): {}\n",
            item.name, item.measurement_unit, item.total_amount
        ));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(name: &str, unit: &str, total: i64) -> CartIngredient {
        CartIngredient {
            name: name.to_string(),
            measurement_unit: unit.to_string(),
            total_amount: total,
        }
    }

    #[test]
    fn test_golden_output() {
        // Cart: Recipe A (Flour 200 g, Sugar 50 g), Recipe B (Flour 100 g,
        // Salt 5 g). The aggregation groups Flour once and orders by name.
        let names = vec!["Recipe A".to_string(), "Recipe B".to_string()];
        let items = vec![
            item("Flour", "g", 300),
            item("Salt", "g", 5),
            item("Sugar", "g", 50),
        ];

        let expected = "Shopping list\n\
                        \n\
                        Recipes:\n\
                        - Recipe A\n\
                        - Recipe B\n\
                        \n\
                        Ingredients:\n\
                        - Flour (g): 300\n\
                        - Salt (g): 5\n\
                        - Sugar (g): 50\n";

        assert_eq!(render(&names, &items), expected);
    }

    #[test]
    fn test_identical_inputs_render_identically() {
        let names = vec!["Borscht".to_string()];
        let items = vec![item("Beetroot", "g", 400)];

        assert_eq!(render(&names, &items), render(&names, &items));
    }

    #[test]
    fn test_empty_cart_renders_empty_sections() {
        let rendered = render(&[], &[]);

        assert_eq!(rendered, "Shopping list\n\nRecipes:\n\nIngredients:\n");
    }
}
