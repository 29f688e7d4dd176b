//! Cities a pickup point may be registered in, and the product types it accepts.

define_wire_enum! {
    /// City of a pickup point.
    ///
    /// Pickup points can only be opened in these cities.
    pub enum City as "city" in "city_type" {
        Moscow => "Москва",
        SaintPetersburg => "Санкт-Петербург",
        Kazan => "Казань",
    }
}

define_wire_enum! {
    /// Kind of goods accepted during a reception.
    pub enum ProductType as "product type" in "product_type" {
        Electronics => "электроника",
        Clothes => "одежда",
        Shoes => "обувь",
    }
}
