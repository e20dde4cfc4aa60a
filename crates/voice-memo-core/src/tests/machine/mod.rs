mod hold;
