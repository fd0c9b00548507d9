use crate::product::ProductDraft;

#[allow(clippy::too_many_arguments)]
fn entry(
    name_en: &str,
    name_hi: &str,
    price_paise: i64,
    description_en: &str,
    description_hi: &str,
    image_url: &str,
    stock: i64,
    category: &str,
) -> ProductDraft {
    ProductDraft {
        name_en: name_en.into(),
        name_hi: name_hi.into(),
        price_paise,
        description_en: Some(description_en.into()),
        description_hi: Some(description_hi.into()),
        image_url: Some(image_url.into()),
        stock,
        category: Some(category.into()),
    }
}

/// Starter catalog loaded into an empty database.
pub fn dairy_catalog() -> Vec<ProductDraft> {
    vec![
        entry(
            "Fresh Cow Milk",
            "ताजा गाय का दूध",
            6000,
            "Pure cow milk from Pithoragarh hills, 1 liter",
            "पिथौरागढ़ की पहाड़ियों से शुद्ध गाय का दूध, 1 लीटर",
            "https://images.unsplash.com/photo-1563636619-e9143da7973b?w=500",
            50,
            "milk",
        ),
        entry(
            "Buffalo Milk",
            "भैंस का दूध",
            7000,
            "Rich buffalo milk from local farms, 1 liter",
            "स्थानीय फार्म से भैंस का दूध, 1 लीटर",
            "https://images.unsplash.com/photo-1550583724-b2692b85b150?w=500",
            40,
            "milk",
        ),
        entry(
            "Buttermilk (Chaach)",
            "छाछ",
            3000,
            "Traditional Uttarakhandi buttermilk, 1 liter",
            "पारंपरिक उत्तराखंडी छाछ, 1 लीटर",
            "https://images.unsplash.com/photo-1623065422902-30a2d299bbe4?w=500",
            60,
            "buttermilk",
        ),
        entry(
            "Fresh Dahi (Curd)",
            "ताजा दही",
            5000,
            "Homemade fresh dahi from Pithoragarh, 500g",
            "पिथौरागढ़ से घर का बना ताजा दही, 500 ग्राम",
            "https://images.unsplash.com/photo-1571212515416-26996e2fd0ae?w=500",
            45,
            "dahi",
        ),
        entry(
            "Pure Desi Ghee",
            "शुद्ध देसी घी",
            65000,
            "100% pure cow ghee from Uttarakhand, 1 kg",
            "उत्तराखंड से 100% शुद्ध गाय का घी, 1 किलो",
            "https://images.unsplash.com/photo-1587048411932-a04b46f98efe?w=500",
            30,
            "ghee",
        ),
        entry(
            "Mountain Butter",
            "पहाड़ी मक्खन",
            20000,
            "Hand-churned butter from Pithoragarh, 500g",
            "पिथौरागढ़ से हाथ से मथा मक्खन, 500 ग्राम",
            "https://images.unsplash.com/photo-1589985270826-4b7bb135bc9d?w=500",
            35,
            "butter",
        ),
        entry(
            "Free Range Eggs",
            "देसी अंडे",
            8000,
            "Fresh free-range eggs from mountain farms, 6 pieces",
            "पहाड़ी फार्म से ताजे देसी अंडे, 6 पीस",
            "https://images.unsplash.com/photo-1582722872445-44dc5f7e3c8f?w=500",
            100,
            "eggs",
        ),
    ]
}
