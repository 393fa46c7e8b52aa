//! Shared test fixtures

use serde_json::json;

use crate::metadata::schema::{Schema, SchemaDocument};

/// A small Northwind-like schema with inheritance, an open type and two
/// containers.
pub(crate) fn northwind() -> Schema {
    let doc: SchemaDocument = serde_json::from_value(json!({
        "namespace": "NorthwindModel",
        "entity_types": [
            {
                "name": "Category",
                "key": ["CategoryID"],
                "properties": [{"name": "CategoryID"}, {"name": "CategoryName"}],
                "navigation_properties": [
                    {"name": "Products", "target": "Product", "partner": "Category", "multiplicity": "many"}
                ]
            },
            {
                "name": "Product",
                "key": ["ProductID"],
                "properties": [
                    {"name": "ProductID"},
                    {"name": "ProductName"},
                    {"name": "UnitPrice"},
                    {"name": "UnitsInStock"},
                    {"name": "Discontinued"},
                    {"name": "RowVersion", "concurrency": true}
                ],
                "navigation_properties": [
                    {"name": "Category", "target": "Category", "partner": "Products"},
                    {"name": "Order_Details", "target": "OrderDetail", "partner": "Product", "multiplicity": "many"}
                ]
            },
            {
                "name": "Order",
                "key": ["OrderID"],
                "properties": [{"name": "OrderID"}, {"name": "OrderDate"}, {"name": "ShipName"}],
                "navigation_properties": [
                    {"name": "Order_Details", "target": "OrderDetail", "partner": "Order", "multiplicity": "many"},
                    {"name": "Customer", "target": "Customer", "partner": "Orders"}
                ]
            },
            {
                "name": "OrderDetail",
                "key": ["OrderID", "ProductID"],
                "properties": [
                    {"name": "OrderID"},
                    {"name": "ProductID"},
                    {"name": "Quantity"},
                    {"name": "UnitPrice"}
                ],
                "navigation_properties": [
                    {"name": "Order", "target": "Order", "partner": "Order_Details"},
                    {"name": "Product", "target": "Product", "partner": "Order_Details"}
                ]
            },
            {
                "name": "Customer",
                "key": ["CustomerID"],
                "properties": [{"name": "CustomerID"}, {"name": "CompanyName"}],
                "navigation_properties": [
                    {"name": "Orders", "target": "Order", "partner": "Customer", "multiplicity": "many"}
                ]
            },
            {
                "name": "Person",
                "key": ["PersonID"],
                "properties": [{"name": "PersonID"}, {"name": "Name"}]
            },
            {
                "name": "Employee",
                "base_type": "Person",
                "properties": [{"name": "Salary"}]
            },
            {
                "name": "Manager",
                "base_type": "Employee",
                "properties": [{"name": "Budget"}]
            },
            {
                "name": "Event",
                "key": ["EventID"],
                "open": true,
                "properties": [{"name": "EventID"}, {"name": "Title"}]
            },
            {
                "name": "Note",
                "properties": [{"name": "Text"}]
            }
        ],
        "enum_types": [
            {"name": "Color", "members": ["Red", "Green", "Blue"]}
        ],
        "containers": [
            {
                "name": "NorthwindEntities",
                "entity_sets": [
                    {"name": "Categories", "entity_type": "Category"},
                    {"name": "Products", "entity_type": "Product"},
                    {"name": "Orders", "entity_type": "Order"},
                    {"name": "Order_Details", "entity_type": "OrderDetail"},
                    {"name": "Customers", "entity_type": "Customer"},
                    {"name": "People", "entity_type": "Person"},
                    {"name": "Events", "entity_type": "Event"},
                    {"name": "Notes", "entity_type": "Note"}
                ],
                "function_imports": [
                    {"name": "GetProductsByRating", "parameters": ["rating"]},
                    {"name": "GetTopProducts", "parameters": ["count"]}
                ]
            },
            {
                "name": "Reporting",
                "function_imports": [
                    {"name": "Get_Top_Products", "parameters": ["count", "since"]}
                ]
            }
        ]
    }))
    .expect("fixture document");

    Schema::from_document(doc).expect("fixture schema")
}
