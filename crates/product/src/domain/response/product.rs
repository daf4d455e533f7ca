use crate::model::product::Product as ProductModel;
use shared::domain::responses::ProductResponse;

// model to response
impl From<ProductModel> for ProductResponse {
    fn from(value: ProductModel) -> Self {
        ProductResponse {
            id: value.product_id,
            name: value.name,
            price: value.price,
            stock_quantity: value.stock_quantity,
            active: value.active,
        }
    }
}
